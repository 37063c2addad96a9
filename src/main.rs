mod classify;
mod company;
mod db;
mod enrich;
mod keywords;
mod models;
mod salary;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use db::{Database, EnrichedFilter};
use enrich::Enricher;
use models::{EnrichedRecord, RawCompany, RawPosting, SkillTaxonomy};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "veille")]
#[command(about = "Job-market watch - enrich raw postings into analysis-ready records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Load raw data written by the ingestion job
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },

    /// Manage per-user skill taxonomies
    Taxonomy {
        #[command(subcommand)]
        command: TaxonomyCommands,
    },

    /// Recompute the enriched table from all raw data and taxonomies
    Enrich {
        /// Show the run summary without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List enriched postings
    List {
        /// Filter by occupation family (e.g. "Data Analyst")
        #[arg(short, long)]
        work_title: Option<String>,

        /// Filter by seniority label (e.g. "Senior/Expert")
        #[arg(short, long)]
        seniority: Option<String>,

        /// Filter by consulting status (e.g. "Internal position")
        #[arg(short, long)]
        consulting: Option<String>,

        /// Filter by normalized schedule type (e.g. "Full-time")
        #[arg(long)]
        schedule: Option<String>,

        /// Filter by company name (exact, case-insensitive)
        #[arg(long)]
        company: Option<String>,

        /// Keep postings whose salary range reaches this annual figure
        #[arg(long)]
        min_salary: Option<f64>,
    },

    /// Show one enriched posting in detail
    Show {
        /// Job ID
        job_id: String,
    },

    /// Distribution summaries over the enriched table
    Stats,
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Load a JSON array of raw postings
    Jobs { file: PathBuf },

    /// Load a JSON array of raw companies
    Companies { file: PathBuf },
}

#[derive(Subcommand)]
enum TaxonomyCommands {
    /// Add or replace one user's taxonomy (category -> skill -> aliases)
    Add {
        /// User the config belongs to
        user: String,

        /// Path to the JSON taxonomy file
        file: PathBuf,
    },

    /// List stored taxonomies
    List,

    /// Remove one user's taxonomy
    Remove {
        /// User whose config should go
        user: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut db = Database::open()?;

    match cli.command {
        Commands::Init => {
            db.init()?;
            println!("Database initialized at {}", db.path().display());
        }

        Commands::Import { command } => {
            db.ensure_initialized()?;
            match command {
                ImportCommands::Jobs { file } => import_jobs(&db, &file)?,
                ImportCommands::Companies { file } => import_companies(&db, &file)?,
            }
        }

        Commands::Taxonomy { command } => {
            db.ensure_initialized()?;
            match command {
                TaxonomyCommands::Add { user, file } => {
                    let content = std::fs::read_to_string(&file)
                        .with_context(|| format!("Failed to read {}", file.display()))?;
                    let categories: BTreeMap<String, BTreeMap<String, Vec<String>>> =
                        serde_json::from_str(&content).with_context(|| {
                            format!(
                                "Malformed taxonomy in {}: expected category -> skill -> [aliases]",
                                file.display()
                            )
                        })?;
                    let skill_count: usize = categories.values().map(|s| s.len()).sum();
                    db.set_skill_config(&SkillTaxonomy {
                        user_id: user.clone(),
                        categories,
                    })?;
                    println!(
                        "Stored taxonomy for '{}' ({} skills). Re-run 'veille enrich' to apply it.",
                        user, skill_count
                    );
                }

                TaxonomyCommands::List => {
                    let configs = db.list_skill_configs()?;
                    if configs.is_empty() {
                        println!("No taxonomies stored.");
                    } else {
                        println!("{:<20} {:<12} {:<10}", "USER", "CATEGORIES", "SKILLS");
                        println!("{}", "-".repeat(42));
                        for config in configs {
                            let skills: usize = config.categories.values().map(|s| s.len()).sum();
                            println!(
                                "{:<20} {:<12} {:<10}",
                                truncate(&config.user_id, 18),
                                config.categories.len(),
                                skills
                            );
                        }
                    }
                }

                TaxonomyCommands::Remove { user } => {
                    if db.remove_skill_config(&user)? {
                        println!("Removed taxonomy for '{}'.", user);
                    } else {
                        println!("No taxonomy stored for '{}'.", user);
                    }
                }
            }
        }

        Commands::Enrich { dry_run } => {
            db.ensure_initialized()?;

            let postings = db.list_raw_jobs()?;
            let companies = db.list_companies()?;
            let taxonomies = db.list_skill_configs()?;
            println!(
                "Enriching {} postings ({} companies, {} taxonomies)...",
                postings.len(),
                companies.len(),
                taxonomies.len()
            );

            let enricher = Enricher::new(companies, taxonomies);
            let records = enricher.enrich_all(&postings);

            let with_salary = records.iter().filter(|r| r.annual_min_salary.is_some()).count();
            let mentioned = records.iter().filter(|r| r.is_salary_mentioned).count();
            let joined = records.iter().filter(|r| r.sector.is_some()).count();
            println!("  Salary mentioned:  {}", mentioned);
            println!("  Salary parsed:     {}", with_salary);
            println!("  Company matched:   {}", joined);

            if dry_run {
                println!("\n(Dry run - enriched table left untouched)");
            } else {
                let written = db.replace_enriched(&records)?;
                println!("\nEnriched table replaced: {} records.", written);
            }
        }

        Commands::List {
            work_title,
            seniority,
            consulting,
            schedule,
            company,
            min_salary,
        } => {
            db.ensure_initialized()?;
            let filter = EnrichedFilter {
                work_title,
                seniority,
                consulting,
                schedule,
                company,
                min_salary,
            };
            let records = db.list_enriched(&filter)?;
            if records.is_empty() {
                println!("No postings found.");
            } else {
                println!(
                    "{:<12} {:<32} {:<20} {:<17} {:<19} {:>13}",
                    "JOB ID", "TITLE", "COMPANY", "SENIORITY", "CONSULTING", "SALARY"
                );
                println!("{}", "-".repeat(117));
                for record in &records {
                    println!(
                        "{:<12} {:<32} {:<20} {:<17} {:<19} {:>13}",
                        truncate(&record.job_id, 10),
                        truncate(&record.title, 30),
                        truncate(record.company_name.as_deref().unwrap_or(""), 18),
                        record.seniority.as_str(),
                        record.consulting_status.as_str(),
                        format_salary(record),
                    );
                }
                println!("\n{} posting(s).", records.len());
            }
        }

        Commands::Show { job_id } => {
            db.ensure_initialized()?;
            match db.get_enriched(&job_id)? {
                Some(record) => print_record(&record),
                None => println!("Job '{}' not found in the enriched table.", job_id),
            }
        }

        Commands::Stats => {
            db.ensure_initialized()?;
            let records = db.list_enriched(&EnrichedFilter::default())?;
            if records.is_empty() {
                println!("Enriched table is empty. Run 'veille enrich' first.");
            } else {
                print_stats(&records);
            }
        }
    }

    Ok(())
}

fn import_jobs(db: &Database, file: &PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(&content).context("Expected a JSON array of postings")?;

    let mut added = 0;
    let mut skipped = 0;
    let mut rejected = 0;
    for (i, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<RawPosting>(row) {
            Ok(posting) if posting.job_id.trim().is_empty() => {
                rejected += 1;
                eprintln!("  Row {}: rejected (empty job_id)", i);
            }
            Ok(posting) => {
                if db.insert_raw_job(&posting)? {
                    added += 1;
                } else {
                    skipped += 1;
                }
            }
            Err(e) => {
                rejected += 1;
                eprintln!("  Row {}: rejected ({})", i, e);
            }
        }
    }

    println!("Postings added: {}", added);
    println!("Already known:  {}", skipped);
    if rejected > 0 {
        println!("Rejected rows:  {}", rejected);
    }
    Ok(())
}

fn import_companies(db: &Database, file: &PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(&content).context("Expected a JSON array of companies")?;

    let mut added = 0;
    let mut skipped = 0;
    let mut rejected = 0;
    for (i, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<RawCompany>(row) {
            Ok(company) if company.company_name.trim().is_empty() => {
                rejected += 1;
                eprintln!("  Row {}: rejected (empty company_name)", i);
            }
            Ok(company) => {
                if db.insert_company(&company)? {
                    added += 1;
                } else {
                    skipped += 1;
                }
            }
            Err(e) => {
                rejected += 1;
                eprintln!("  Row {}: rejected ({})", i, e);
            }
        }
    }

    println!("Companies added: {}", added);
    println!("Already known:   {}", skipped);
    if rejected > 0 {
        println!("Rejected rows:   {}", rejected);
    }
    Ok(())
}

fn format_salary(record: &EnrichedRecord) -> String {
    match (record.annual_min_salary, record.annual_max_salary) {
        (Some(min), Some(max)) if min != max => format!("{}k-{}k€", min / 1000.0, max / 1000.0),
        (Some(min), _) => format!("{}k€", min / 1000.0),
        (None, Some(max)) => format!("up to {}k€", max / 1000.0),
        (None, None) if record.is_salary_mentioned => "mentioned".to_string(),
        (None, None) => "-".to_string(),
    }
}

fn print_record(record: &EnrichedRecord) {
    println!("Job {}", record.job_id);
    println!("Title: {}", record.title);
    if let Some(company) = &record.company_name {
        println!("Company: {}", company);
    }
    if let Some(location) = &record.location {
        println!("Location: {}", location);
    }
    println!("Work titles: {}", record.work_titles.join(", "));
    println!("Seniority: {}", record.seniority.as_str());
    println!("Consulting: {}", record.consulting_status.as_str());
    if let Some(schedule) = &record.schedule_type {
        println!("Schedule: {}", schedule);
    }
    println!("Salary: {}", format_salary(record));

    for (label, tags) in [
        ("Languages", &record.languages),
        ("BI tools", &record.bi_tools),
        ("Cloud platforms", &record.cloud_platforms),
        ("Data modeling", &record.data_modeling),
    ] {
        if !tags.is_empty() {
            println!("{}: {}", label, tags.join(", "));
        }
    }
    for (category, skills) in &record.found_skills {
        let skills: Vec<&str> = skills.iter().map(String::as_str).collect();
        println!("Skills [{}]: {}", category, skills.join(", "));
    }

    if record.sector.is_some() || record.company_size.is_some() {
        println!(
            "Company profile: {} | {} | {}",
            record.sector.as_deref().unwrap_or("Not specified"),
            record.company_size.as_deref().unwrap_or("Not specified"),
            record.company_category.as_deref().unwrap_or("Not specified"),
        );
    }
    for link in &record.apply_links {
        println!(
            "Apply: {} ({})",
            link.link,
            link.title.as_deref().unwrap_or("link")
        );
    }
}

fn print_stats(records: &[EnrichedRecord]) {
    println!("{} enriched postings.\n", records.len());

    let mentioned = records.iter().filter(|r| r.is_salary_mentioned).count();
    println!(
        "Salary transparency: {}/{} ({:.0}%)",
        mentioned,
        records.len(),
        100.0 * mentioned as f64 / records.len() as f64
    );

    print_distribution(
        "Seniority",
        records.iter().map(|r| r.seniority.as_str().to_string()),
    );
    print_distribution(
        "Consulting",
        records.iter().map(|r| r.consulting_status.as_str().to_string()),
    );
    print_distribution(
        "Top work titles",
        records.iter().flat_map(|r| r.work_titles.iter().cloned()),
    );
    print_distribution(
        "Top companies",
        records
            .iter()
            .filter_map(|r| r.company_name.clone()),
    );
}

fn print_distribution(header: &str, values: impl Iterator<Item = String>) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    counts.truncate(10);

    println!("\n{}:", header);
    for (value, count) in counts {
        println!("  {:<35} {:>5}", truncate(&value, 33), count);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{ConsultingStatus, Seniority};

    fn record(min: Option<f64>, max: Option<f64>, mentioned: bool) -> EnrichedRecord {
        EnrichedRecord {
            job_id: "j1".to_string(),
            title: "Data Analyst".to_string(),
            company_name: None,
            location: None,
            description: None,
            salary_text: None,
            posted_at: None,
            apply_links: vec![],
            source: None,
            share_link: None,
            thumbnail: None,
            created_at: None,
            annual_min_salary: min,
            annual_max_salary: max,
            is_salary_mentioned: mentioned,
            schedule_type: None,
            work_titles: vec!["Data Analyst".to_string()],
            seniority: Seniority::NotSpecified,
            languages: vec![],
            bi_tools: vec![],
            cloud_platforms: vec![],
            data_modeling: vec![],
            found_skills: Default::default(),
            sector: None,
            company_size: None,
            company_category: None,
            consulting_status: ConsultingStatus::InternalPosition,
        }
    }

    #[test]
    fn salary_column_formats() {
        assert_eq!(
            format_salary(&record(Some(45_000.0), Some(55_000.0), true)),
            "45k-55k€"
        );
        assert_eq!(format_salary(&record(Some(42_000.0), Some(42_000.0), true)), "42k€");
        assert_eq!(format_salary(&record(None, None, true)), "mentioned");
        assert_eq!(format_salary(&record(None, None, false)), "-");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly ten", 11), "exactly ten");
        assert_eq!(truncate("ingénieur décisionnel senior", 12), "ingénieur...");
    }
}
