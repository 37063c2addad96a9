use crate::models::SkillTaxonomy;
use std::collections::{BTreeMap, BTreeSet};

/// A fixed vocabulary: canonical label plus the surface forms that imply it.
pub type KeywordTable = &'static [(&'static str, &'static [&'static str])];

pub const LANGUAGES: KeywordTable = &[
    ("dax", &["dax"]),
    ("python", &["python"]),
    ("r", &["r"]),
    ("sas", &["sas"]),
    ("scala", &["scala"]),
    ("sql", &["sql"]),
    ("vba", &["vba"]),
];

pub const BI_TOOLS: KeywordTable = &[
    ("excel", &["excel"]),
    ("looker", &["looker"]),
    ("looker studio", &["looker studio", "data studio"]),
    ("metabase", &["metabase"]),
    ("power bi", &["power bi", "powerbi"]),
    ("qlik", &["qlik"]),
    ("ssis", &["ssis"]),
    ("ssrs", &["ssrs"]),
    ("superset", &["superset"]),
    ("tableau", &["tableau"]),
];

pub const CLOUD_PLATFORMS: KeywordTable = &[
    ("aws", &["aws", "amazon web services"]),
    ("azure", &["azure"]),
    ("bigquery", &["bigquery", "big query"]),
    ("databricks", &["databricks"]),
    ("gcp", &["gcp", "google cloud"]),
    ("redshift", &["redshift"]),
    ("snowflake", &["snowflake"]),
    ("synapse", &["synapse"]),
];

pub const DATA_MODELING: KeywordTable = &[
    ("data vault", &["data vault"]),
    ("data warehouse", &["data warehouse", "datawarehouse", "entrepôt de données", "dwh"]),
    ("datamart", &["datamart", "data mart"]),
    ("dbt", &["dbt"]),
    ("kimball", &["kimball"]),
    ("olap", &["olap"]),
    ("star schema", &["star schema", "modèle en étoile"]),
];

/// Tests one keyword against a lowercased text field.
///
/// Plain substring containment, except that keywords of three characters or
/// fewer ("r", "bi", "sas") must land on word boundaries: matching "bi"
/// inside "combine" would tag half the corpus.
pub fn keyword_matches(text: &str, keyword: &str) -> bool {
    if keyword.is_empty() {
        return false;
    }
    if keyword.chars().count() > 3 {
        return text.contains(keyword);
    }

    let mut from = 0;
    while let Some(rel) = text[from..].find(keyword) {
        let start = from + rel;
        let end = start + keyword.len();
        let clear_before = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let clear_after = text[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        if clear_before && clear_after {
            return true;
        }
        // Step past the first character of this occurrence and keep looking.
        from = start
            + text[start..]
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(1);
    }
    false
}

/// Collects the canonical labels of a fixed table that match `full_text`.
/// Tables are kept sorted by label, so the output order is stable.
pub fn tag_static(full_text: &str, table: KeywordTable) -> Vec<String> {
    table
        .iter()
        .filter(|(_, aliases)| aliases.iter().any(|a| keyword_matches(full_text, a)))
        .map(|(label, _)| (*label).to_string())
        .collect()
}

/// Runs every user taxonomy over `full_text` and unions the hits.
///
/// The same alias under different canonical names or categories produces one
/// entry per (category, canonical) pair; duplicates across users collapse.
/// Categories with no hits never appear as keys.
pub fn tag_taxonomies(
    full_text: &str,
    taxonomies: &[SkillTaxonomy],
) -> BTreeMap<String, BTreeSet<String>> {
    let mut found: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for taxonomy in taxonomies {
        for (category, skills) in &taxonomy.categories {
            for (canonical, aliases) in skills {
                let hit = aliases
                    .iter()
                    .any(|alias| keyword_matches(full_text, &alias.to_lowercase()));
                if hit {
                    found
                        .entry(category.clone())
                        .or_default()
                        .insert(canonical.clone());
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn taxonomy(user: &str, entries: &[(&str, &str, &[&str])]) -> SkillTaxonomy {
        let mut categories: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        for (category, canonical, aliases) in entries {
            categories
                .entry((*category).to_string())
                .or_default()
                .insert(
                    (*canonical).to_string(),
                    aliases.iter().map(|a| (*a).to_string()).collect(),
                );
        }
        SkillTaxonomy {
            user_id: user.to_string(),
            categories,
        }
    }

    #[test]
    fn short_keywords_need_word_boundaries() {
        assert!(keyword_matches("he is a bi expert", "bi"));
        assert!(!keyword_matches("combine data sources", "bi"));
        assert!(!keyword_matches("mobile first", "bi"));
        assert!(keyword_matches("power bi, sql", "bi"));
    }

    #[test]
    fn single_letter_language_does_not_match_inside_words() {
        assert!(keyword_matches("python/r developer", "r"));
        assert!(keyword_matches("r & python", "r"));
        assert!(!keyword_matches("senior developer", "r"));
    }

    #[test]
    fn boundary_scan_skips_embedded_occurrences() {
        // First "sas" sits inside a word, the second stands alone.
        assert!(keyword_matches("sasquatch loves sas", "sas"));
        assert!(!keyword_matches("sasquatch", "sas"));
    }

    #[test]
    fn long_keywords_match_as_substrings() {
        assert!(keyword_matches("experience with snowflakes", "snowflake"));
        assert!(keyword_matches("powerbi dashboards", "powerbi"));
    }

    #[test]
    fn static_tagging_returns_sorted_canonical_labels() {
        let text = "analyste sql, python et power bi sur gcp";
        assert_eq!(tag_static(text, LANGUAGES), vec!["python", "sql"]);
        assert_eq!(tag_static(text, BI_TOOLS), vec!["power bi"]);
        assert_eq!(tag_static(text, CLOUD_PLATFORMS), vec!["gcp"]);
        assert!(tag_static(text, DATA_MODELING).is_empty());
    }

    #[test]
    fn alias_variants_resolve_to_one_canonical() {
        let text = "reporting in data studio";
        assert_eq!(tag_static(text, BI_TOOLS), vec!["looker studio"]);
    }

    #[test]
    fn taxonomies_union_across_users_and_categories() {
        // Both users key the same alias "sql" under different canonical
        // names in different categories; each lands in its own category.
        let a = taxonomy("alice", &[("languages", "SQL", &["sql"])]);
        let b = taxonomy("bob", &[("databases", "PostgreSQL", &["sql", "postgres"])]);

        let found = tag_taxonomies("we need strong sql skills", &[a, b]);
        assert_eq!(found.len(), 2);
        assert!(found["languages"].contains("SQL"));
        assert!(found["databases"].contains("PostgreSQL"));
    }

    #[test]
    fn duplicate_hits_collapse_to_one_entry() {
        let a = taxonomy("alice", &[("viz", "Tableau", &["tableau"])]);
        let b = taxonomy("bob", &[("viz", "Tableau", &["tableau", "tableau software"])]);

        let found = tag_taxonomies("tableau dashboards", &[a, b]);
        assert_eq!(found["viz"].len(), 1);
    }

    #[test]
    fn empty_categories_are_absent_not_empty() {
        let a = taxonomy(
            "alice",
            &[("viz", "Tableau", &["tableau"]), ("ml", "PyTorch", &["pytorch"])],
        );
        let found = tag_taxonomies("tableau only here", &[a]);
        assert!(found.contains_key("viz"));
        assert!(!found.contains_key("ml"));
    }

    #[test]
    fn no_taxonomies_means_no_skills() {
        assert!(tag_taxonomies("anything at all", &[]).is_empty());
    }

    #[test]
    fn taxonomy_aliases_are_case_insensitive() {
        let a = taxonomy("alice", &[("viz", "Power BI", &["Power BI"])]);
        let found = tag_taxonomies("dashboarding with power bi", &[a]);
        assert!(found["viz"].contains("Power BI"));
    }
}
