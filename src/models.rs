use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One apply option carried over from the job-search API payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyLink {
    #[serde(default)]
    pub title: Option<String>,
    pub link: String,
}

/// A posting exactly as the ingestion job wrote it. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPosting {
    pub job_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "salary")]
    pub salary_text: Option<String>,
    #[serde(default, alias = "schedule_type")]
    pub schedule_text: Option<String>,
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default, alias = "apply_options")]
    pub apply_links: Vec<ApplyLink>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub share_link: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Structured attributes returned by the enterprise registry for one company.
/// Only the fields the pipeline reads are modeled; the rest of the blob is
/// dropped on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    #[serde(default)]
    pub nom_complet: Option<String>,
    /// NAF activity code, e.g. "70.22Z".
    #[serde(default)]
    pub activite_principale: Option<String>,
    /// NAF section letter, one of A..U.
    #[serde(default)]
    pub section_activite_principale: Option<String>,
    /// INSEE head-count bracket code, e.g. "12", or "NN" when unknown.
    #[serde(default)]
    pub tranche_effectif_salarie: Option<String>,
    /// "PME", "ETI" or "GE".
    #[serde(default)]
    pub categorie_entreprise: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCompany {
    pub company_name: String,
    #[serde(default, alias = "company_info")]
    pub info: Option<CompanyInfo>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Per-user skill vocabulary: category -> canonical skill -> aliases.
/// Aliases are case-insensitive surface forms and may repeat across
/// categories within one config or across users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTaxonomy {
    pub user_id: String,
    pub categories: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

/// Single-label seniority, assigned by the first matching rule group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seniority {
    #[serde(rename = "Intern/Apprentice")]
    InternApprentice,
    #[serde(rename = "Senior/Expert")]
    SeniorExpert,
    #[serde(rename = "Lead/Manager")]
    LeadManager,
    #[serde(rename = "Junior")]
    Junior,
    #[serde(rename = "Not specified")]
    NotSpecified,
}

impl Seniority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::InternApprentice => "Intern/Apprentice",
            Seniority::SeniorExpert => "Senior/Expert",
            Seniority::LeadManager => "Lead/Manager",
            Seniority::Junior => "Junior",
            Seniority::NotSpecified => "Not specified",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Intern/Apprentice" => Some(Seniority::InternApprentice),
            "Senior/Expert" => Some(Seniority::SeniorExpert),
            "Lead/Manager" => Some(Seniority::LeadManager),
            "Junior" => Some(Seniority::Junior),
            "Not specified" => Some(Seniority::NotSpecified),
            _ => None,
        }
    }
}

/// Tri-state consulting classification combining title and company signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsultingStatus {
    #[serde(rename = "Consulting")]
    Consulting,
    #[serde(rename = "Probably consulting")]
    ProbablyConsulting,
    #[serde(rename = "Internal position")]
    InternalPosition,
}

impl ConsultingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultingStatus::Consulting => "Consulting",
            ConsultingStatus::ProbablyConsulting => "Probably consulting",
            ConsultingStatus::InternalPosition => "Internal position",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Consulting" => Some(ConsultingStatus::Consulting),
            "Probably consulting" => Some(ConsultingStatus::ProbablyConsulting),
            "Internal position" => Some(ConsultingStatus::InternalPosition),
            _ => None,
        }
    }
}

/// The fully derived record: a pure function of one posting, the company
/// table and the taxonomy snapshot. Recomputed wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub job_id: String,
    pub title: String,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub salary_text: Option<String>,
    pub posted_at: Option<String>,
    pub apply_links: Vec<ApplyLink>,
    pub source: Option<String>,
    pub share_link: Option<String>,
    pub thumbnail: Option<String>,
    pub created_at: Option<String>,

    pub annual_min_salary: Option<f64>,
    pub annual_max_salary: Option<f64>,
    pub is_salary_mentioned: bool,
    pub schedule_type: Option<String>,

    /// Occupation families, sorted, never empty ("Other" when nothing hit).
    pub work_titles: Vec<String>,
    pub seniority: Seniority,

    pub languages: Vec<String>,
    pub bi_tools: Vec<String>,
    pub cloud_platforms: Vec<String>,
    pub data_modeling: Vec<String>,
    /// category -> canonical skills, unioned over all user taxonomies.
    /// Categories with no hits are absent.
    pub found_skills: BTreeMap<String, BTreeSet<String>>,

    pub sector: Option<String>,
    pub company_size: Option<String>,
    pub company_category: Option<String>,
    pub consulting_status: ConsultingStatus,
}
