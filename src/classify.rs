use crate::models::Seniority;

/// Occupation families, each with the title keywords that imply it. A title
/// can hit several families; the classification is the union of all hits.
/// Keywords here are plain substrings (titles are short enough that the
/// word-boundary rule for content text is not needed).
const WORK_TITLE_RULES: &[(&str, &[&str])] = &[
    (
        "Data Analyst",
        &[
            "data analyst",
            "analyste de données",
            "analyste de donnees",
            "analyste data",
            "analyste données",
        ],
    ),
    (
        "Analytics Engineer",
        &["analytics engineer", "analytics engineering", "ingénieur analytics"],
    ),
    (
        "BI/Decision Support Specialist",
        &[
            "business intelligence",
            "bi analyst",
            "bi engineer",
            "bi developer",
            "ingénieur bi",
            "ingenieur bi",
            "développeur bi",
            "developpeur bi",
            "consultant bi",
            "analyste bi",
            "décisionnel",
            "decisionnel",
            "power bi",
        ],
    ),
    (
        "Business/Functional Analyst",
        &[
            "business analyst",
            "functional analyst",
            "analyste fonctionnel",
            "analyste métier",
            "amoa",
        ],
    ),
    ("Data Scientist", &["data scientist", "data science"]),
    (
        "Data Engineer",
        &["data engineer", "data engineering", "ingénieur data", "ingenieur data"],
    ),
];

/// Seniority rule groups in priority order. Evaluation stops at the first
/// group with a hit: a "Lead ... Intern" title is an internship, because
/// internships are checked before lead roles. This ordering is a business
/// rule, not an implementation accident.
const SENIORITY_RULES: &[(Seniority, &[&str])] = &[
    (
        Seniority::InternApprentice,
        &["intern", "stage", "stagiaire", "alternan", "apprenti", "apprentice"],
    ),
    (
        Seniority::SeniorExpert,
        &["senior", "sénior", "expert", "confirmé", "confirme"],
    ),
    (
        Seniority::LeadManager,
        &["lead", "manager", "head of", "responsable", "directeur", "chef de"],
    ),
    (Seniority::Junior, &["junior", "débutant", "debutant"]),
];

/// Raw schedule phrases (FR from the job-search API, EN fallbacks) keyed by
/// substring, first match wins.
const SCHEDULE_RULES: &[(&str, &str)] = &[
    ("stage", "Internship"),
    ("intern", "Internship"),
    ("alternance", "Internship"),
    ("prestataire", "Contractor"),
    ("freelance", "Contractor"),
    ("indépendant", "Contractor"),
    ("independant", "Contractor"),
    ("contract", "Contractor"),
    ("temps partiel", "Part-time"),
    ("part-time", "Part-time"),
    ("part time", "Part-time"),
    ("plein temps", "Full-time"),
    ("temps plein", "Full-time"),
    ("full-time", "Full-time"),
    ("full time", "Full-time"),
];

/// Multi-label occupation classification over the lowercased title.
/// Returns the sorted union of matching families, or `["Other"]` when the
/// title matches nothing.
pub fn classify_work_titles(title_lower: &str) -> Vec<String> {
    let mut titles: Vec<String> = WORK_TITLE_RULES
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| title_lower.contains(k)))
        .map(|(label, _)| (*label).to_string())
        .collect();
    if titles.is_empty() {
        titles.push("Other".to_string());
    }
    titles.sort();
    titles
}

/// Single-label seniority over the lowercased title, first-match-wins.
pub fn classify_seniority(title_lower: &str) -> Seniority {
    for (label, keywords) in SENIORITY_RULES {
        if keywords.iter().any(|k| title_lower.contains(k)) {
            return *label;
        }
    }
    Seniority::NotSpecified
}

/// Normalizes free-text schedule types. Unrecognized values pass through
/// unchanged so the dashboard can still group on them.
pub fn normalize_schedule(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let lower = raw.to_lowercase();
    for (needle, label) in SCHEDULE_RULES {
        if lower.contains(needle) {
            return Some((*label).to_string());
        }
    }
    Some(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_titles_union_all_matching_families() {
        let titles = classify_work_titles("data scientist / analytics engineer");
        assert_eq!(titles, vec!["Analytics Engineer", "Data Scientist"]);
    }

    #[test]
    fn work_titles_fall_back_to_other() {
        assert_eq!(classify_work_titles("comptable fournisseurs"), vec!["Other"]);
    }

    #[test]
    fn french_title_keywords_are_recognized() {
        assert_eq!(
            classify_work_titles("analyste de données senior"),
            vec!["Data Analyst"]
        );
        assert_eq!(
            classify_work_titles("développeur bi décisionnel"),
            vec!["BI/Decision Support Specialist"]
        );
    }

    #[test]
    fn power_bi_in_title_counts_as_bi_specialist() {
        let titles = classify_work_titles("data analyst power bi");
        assert_eq!(
            titles,
            vec!["BI/Decision Support Specialist", "Data Analyst"]
        );
    }

    #[test]
    fn seniority_intern_outranks_lead() {
        assert_eq!(
            classify_seniority("lead data analyst intern"),
            Seniority::InternApprentice
        );
    }

    #[test]
    fn seniority_senior_outranks_lead() {
        assert_eq!(
            classify_seniority("senior engineering manager"),
            Seniority::SeniorExpert
        );
    }

    #[test]
    fn seniority_groups_match_french_forms() {
        assert_eq!(classify_seniority("data analyst en alternance"), Seniority::InternApprentice);
        assert_eq!(classify_seniority("data analyst confirmé"), Seniority::SeniorExpert);
        assert_eq!(classify_seniority("responsable data"), Seniority::LeadManager);
        assert_eq!(classify_seniority("data analyst junior"), Seniority::Junior);
    }

    #[test]
    fn seniority_defaults_to_not_specified() {
        assert_eq!(classify_seniority("data analyst"), Seniority::NotSpecified);
    }

    #[test]
    fn schedule_types_normalize_french_phrases() {
        assert_eq!(normalize_schedule(Some("À plein temps")), Some("Full-time".into()));
        assert_eq!(normalize_schedule(Some("À temps partiel")), Some("Part-time".into()));
        assert_eq!(normalize_schedule(Some("Stage")), Some("Internship".into()));
        assert_eq!(normalize_schedule(Some("Prestataire")), Some("Contractor".into()));
    }

    #[test]
    fn unknown_schedule_passes_through_unchanged() {
        assert_eq!(normalize_schedule(Some("CDI cadre")), Some("CDI cadre".into()));
        assert_eq!(normalize_schedule(None), None);
    }
}
