use crate::models::{CompanyInfo, ConsultingStatus};

/// The 21 NAF section letters and their readable sector names.
const NAF_SECTIONS: &[(&str, &str)] = &[
    ("A", "Agriculture, forestry and fishing"),
    ("B", "Mining and quarrying"),
    ("C", "Manufacturing"),
    ("D", "Electricity, gas and steam supply"),
    ("E", "Water supply and waste management"),
    ("F", "Construction"),
    ("G", "Wholesale and retail trade"),
    ("H", "Transportation and storage"),
    ("I", "Accommodation and food services"),
    ("J", "Information and communication"),
    ("K", "Financial and insurance activities"),
    ("L", "Real estate activities"),
    ("M", "Professional, scientific and technical activities"),
    ("N", "Administrative and support services"),
    ("O", "Public administration and defence"),
    ("P", "Education"),
    ("Q", "Human health and social work"),
    ("R", "Arts, entertainment and recreation"),
    ("S", "Other service activities"),
    ("T", "Household employer activities"),
    ("U", "Extraterritorial organisations"),
];

/// INSEE head-count brackets (tranche_effectif_salarie).
const SIZE_BRACKETS: &[(&str, &str)] = &[
    ("00", "0 employees"),
    ("01", "1-2 employees"),
    ("02", "3-5 employees"),
    ("03", "6-9 employees"),
    ("11", "10-19 employees"),
    ("12", "20-49 employees"),
    ("21", "50-99 employees"),
    ("22", "100-199 employees"),
    ("31", "200-249 employees"),
    ("32", "250-499 employees"),
    ("41", "500-999 employees"),
    ("42", "1000-1999 employees"),
    ("51", "2000-4999 employees"),
    ("52", "5000-9999 employees"),
    ("53", "10000+ employees"),
];

const ENTERPRISE_CATEGORIES: &[(&str, &str)] = &[
    ("PME", "Small or Medium Enterprise"),
    ("ETI", "Intermediate-sized Enterprise"),
    ("GE", "Large Enterprise"),
];

/// NAF activity prefixes that mark a company as a consultancy: 70.22
/// (business and management consulting) and 62.02 (IT consulting).
const CONSULTING_NAF_PREFIXES: &[&str] = &["70.22", "62.02"];

/// Readable company attributes decoded from the registry blob. A posting
/// whose company has no registry row gets no attributes at all; a matched
/// company with gaps in the blob gets "Not specified" per field.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyAttributes {
    pub sector: String,
    pub size: String,
    pub category: String,
    pub is_consulting: bool,
}

pub fn decode_company(info: &CompanyInfo) -> CompanyAttributes {
    CompanyAttributes {
        sector: lookup(NAF_SECTIONS, info.section_activite_principale.as_deref()),
        size: lookup(SIZE_BRACKETS, info.tranche_effectif_salarie.as_deref()),
        category: lookup(ENTERPRISE_CATEGORIES, info.categorie_entreprise.as_deref()),
        is_consulting: info
            .activite_principale
            .as_deref()
            .is_some_and(|naf| CONSULTING_NAF_PREFIXES.iter().any(|p| naf.starts_with(p))),
    }
}

fn lookup(table: &[(&str, &str)], code: Option<&str>) -> String {
    code.and_then(|c| {
        table
            .iter()
            .find(|(key, _)| *key == c)
            .map(|(_, label)| (*label).to_string())
    })
    .unwrap_or_else(|| "Not specified".to_string())
}

/// Ordered consulting checks on the lowercased title plus the company flag.
///
/// Rule (a) on the bare "consult" substring subsumes the title side of (b)
/// and (c). The narrower consultant/consulting test stays as written: the
/// broader catch is the deliberate first rule.
pub fn consulting_status(title_lower: &str, company_is_consulting: bool) -> ConsultingStatus {
    let title_says_consultant =
        title_lower.contains("consultant") || title_lower.contains("consulting");

    if title_lower.contains("consult") {
        ConsultingStatus::Consulting
    } else if title_says_consultant && company_is_consulting {
        ConsultingStatus::Consulting
    } else if title_says_consultant || company_is_consulting {
        ConsultingStatus::ProbablyConsulting
    } else {
        ConsultingStatus::InternalPosition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(section: Option<&str>, bracket: Option<&str>, category: Option<&str>) -> CompanyInfo {
        CompanyInfo {
            section_activite_principale: section.map(String::from),
            tranche_effectif_salarie: bracket.map(String::from),
            categorie_entreprise: category.map(String::from),
            ..CompanyInfo::default()
        }
    }

    #[test]
    fn all_21_naf_sections_are_mapped() {
        assert_eq!(NAF_SECTIONS.len(), 21);
        for letter in 'A'..='U' {
            let attrs = decode_company(&info(Some(&letter.to_string()), None, None));
            assert_ne!(attrs.sector, "Not specified", "section {letter}");
        }
    }

    #[test]
    fn unmapped_or_missing_codes_become_not_specified() {
        let attrs = decode_company(&info(Some("Z"), Some("NN"), Some("XXL")));
        assert_eq!(attrs.sector, "Not specified");
        assert_eq!(attrs.size, "Not specified");
        assert_eq!(attrs.category, "Not specified");

        let attrs = decode_company(&CompanyInfo::default());
        assert_eq!(attrs.sector, "Not specified");
        assert!(!attrs.is_consulting);
    }

    #[test]
    fn known_codes_decode_to_readable_labels() {
        let attrs = decode_company(&info(Some("J"), Some("12"), Some("ETI")));
        assert_eq!(attrs.sector, "Information and communication");
        assert_eq!(attrs.size, "20-49 employees");
        assert_eq!(attrs.category, "Intermediate-sized Enterprise");
    }

    #[test]
    fn consulting_naf_codes_set_the_flag() {
        for (naf, expected) in [
            ("70.22Z", true),
            ("62.02A", true),
            ("62.01Z", false),
            ("47.11D", false),
        ] {
            let company = CompanyInfo {
                activite_principale: Some(naf.to_string()),
                ..CompanyInfo::default()
            };
            assert_eq!(decode_company(&company).is_consulting, expected, "{naf}");
        }
    }

    #[test]
    fn consult_substring_wins_regardless_of_company_flag() {
        assert_eq!(
            consulting_status("senior consultant", false),
            ConsultingStatus::Consulting
        );
        assert_eq!(
            consulting_status("senior consultant", true),
            ConsultingStatus::Consulting
        );
        // The bare substring catches forms the consultant/consulting test
        // would miss.
        assert_eq!(
            consulting_status("consultante bi", false),
            ConsultingStatus::Consulting
        );
    }

    #[test]
    fn company_flag_alone_is_only_probably_consulting() {
        assert_eq!(
            consulting_status("data analyst", true),
            ConsultingStatus::ProbablyConsulting
        );
    }

    #[test]
    fn no_signal_means_internal_position() {
        assert_eq!(
            consulting_status("data analyst", false),
            ConsultingStatus::InternalPosition
        );
    }
}
