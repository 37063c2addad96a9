use std::collections::HashMap;

use crate::classify::{classify_seniority, classify_work_titles, normalize_schedule};
use crate::company::{consulting_status, decode_company};
use crate::keywords::{
    tag_static, tag_taxonomies, BI_TOOLS, CLOUD_PLATFORMS, DATA_MODELING, LANGUAGES,
};
use crate::models::{EnrichedRecord, RawCompany, RawPosting, SkillTaxonomy};
use crate::salary::parse_salary;

/// Immutable per-run snapshot: the company table and every active user
/// taxonomy. Each posting is enriched independently of every other, so a
/// run can be recomputed (or parallelized) at will and always produces the
/// same records for the same inputs.
pub struct Enricher {
    companies: HashMap<String, RawCompany>,
    taxonomies: Vec<SkillTaxonomy>,
}

impl Enricher {
    pub fn new(companies: Vec<RawCompany>, taxonomies: Vec<SkillTaxonomy>) -> Self {
        let companies = companies
            .into_iter()
            .map(|c| (c.company_name.clone(), c))
            .collect();
        Self {
            companies,
            taxonomies,
        }
    }

    /// Pure per-record transform. Never fails: every parsing gap becomes a
    /// null field, never an error.
    pub fn enrich(&self, posting: &RawPosting) -> EnrichedRecord {
        let title_lower = posting.title.to_lowercase();
        let full_text = format!(
            "{} {}",
            title_lower,
            posting.description.as_deref().unwrap_or("").to_lowercase()
        );

        let salary = parse_salary(posting.salary_text.as_deref());

        // Exact-name company join; a miss leaves every company field null.
        let company = posting
            .company_name
            .as_deref()
            .and_then(|name| self.companies.get(name));
        let attrs = company.and_then(|c| c.info.as_ref()).map(decode_company);
        let company_is_consulting = attrs.as_ref().is_some_and(|a| a.is_consulting);

        EnrichedRecord {
            job_id: posting.job_id.clone(),
            title: posting.title.clone(),
            company_name: posting.company_name.clone(),
            location: posting.location.clone(),
            description: posting.description.clone(),
            salary_text: posting.salary_text.clone(),
            posted_at: posting.posted_at.clone(),
            apply_links: posting.apply_links.clone(),
            source: posting.source.clone(),
            share_link: posting.share_link.clone(),
            thumbnail: posting.thumbnail.clone(),
            created_at: posting.created_at.clone(),

            annual_min_salary: salary.annual_min,
            annual_max_salary: salary.annual_max,
            is_salary_mentioned: salary.is_mentioned,
            schedule_type: normalize_schedule(posting.schedule_text.as_deref()),

            work_titles: classify_work_titles(&title_lower),
            seniority: classify_seniority(&title_lower),

            languages: tag_static(&full_text, LANGUAGES),
            bi_tools: tag_static(&full_text, BI_TOOLS),
            cloud_platforms: tag_static(&full_text, CLOUD_PLATFORMS),
            data_modeling: tag_static(&full_text, DATA_MODELING),
            found_skills: tag_taxonomies(&full_text, &self.taxonomies),

            sector: attrs.as_ref().map(|a| a.sector.clone()),
            company_size: attrs.as_ref().map(|a| a.size.clone()),
            company_category: attrs.as_ref().map(|a| a.category.clone()),
            consulting_status: consulting_status(&title_lower, company_is_consulting),
        }
    }

    pub fn enrich_all(&self, postings: &[RawPosting]) -> Vec<EnrichedRecord> {
        postings.iter().map(|p| self.enrich(p)).collect()
    }
}
