use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};
use std::path::PathBuf;

use crate::models::{
    ConsultingStatus, EnrichedRecord, RawCompany, RawPosting, Seniority, SkillTaxonomy,
};

pub struct Database {
    conn: Connection,
    path: PathBuf,
}

/// Optional predicates for querying the enriched table.
#[derive(Debug, Default)]
pub struct EnrichedFilter {
    pub work_title: Option<String>,
    pub seniority: Option<String>,
    pub consulting: Option<String>,
    pub schedule: Option<String>,
    pub company: Option<String>,
    pub min_salary: Option<f64>,
}

impl Database {
    pub fn open() -> Result<Self> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        Ok(Self { conn, path })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn,
            path: PathBuf::from(":memory:"),
        };
        db.init()?;
        Ok(db)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn default_path() -> Result<PathBuf> {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "veille") {
            Ok(proj_dirs.data_dir().join("veille.db"))
        } else {
            Ok(PathBuf::from("veille.db"))
        }
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS raw_jobs (
                job_id TEXT PRIMARY KEY,
                title TEXT NOT NULL DEFAULT '',
                company_name TEXT,
                location TEXT,
                description TEXT,
                salary_text TEXT,
                schedule_text TEXT,
                posted_at TEXT,
                apply_links TEXT NOT NULL DEFAULT '[]',
                source TEXT,
                share_link TEXT,
                thumbnail TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS raw_companies (
                company_name TEXT PRIMARY KEY,
                info TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS skill_configs (
                user_id TEXT PRIMARY KEY,
                config TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS enriched_jobs (
                job_id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                company_name TEXT,
                location TEXT,
                description TEXT,
                salary_text TEXT,
                posted_at TEXT,
                apply_links TEXT NOT NULL,
                source TEXT,
                share_link TEXT,
                thumbnail TEXT,
                created_at TEXT,
                annual_min_salary REAL,
                annual_max_salary REAL,
                is_salary_mentioned INTEGER NOT NULL,
                schedule_type TEXT,
                work_titles TEXT NOT NULL,
                seniority TEXT NOT NULL,
                languages TEXT NOT NULL,
                bi_tools TEXT NOT NULL,
                cloud_platforms TEXT NOT NULL,
                data_modeling TEXT NOT NULL,
                found_skills TEXT NOT NULL,
                sector TEXT,
                company_size TEXT,
                company_category TEXT,
                consulting_status TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_enriched_seniority ON enriched_jobs(seniority);
            CREATE INDEX IF NOT EXISTS idx_enriched_consulting ON enriched_jobs(consulting_status);
            CREATE INDEX IF NOT EXISTS idx_enriched_company ON enriched_jobs(company_name);
            "#,
        )?;
        Ok(())
    }

    pub fn ensure_initialized(&self) -> Result<()> {
        let tables: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='raw_jobs'",
            [],
            |row| row.get(0),
        )?;
        if tables == 0 {
            return Err(anyhow!("Database not initialized. Run 'veille init' first."));
        }
        Ok(())
    }

    // --- Raw posting operations ---

    /// Inserts one raw posting; returns false if the job_id already exists
    /// (first-seen wins, the ingestion contract).
    pub fn insert_raw_job(&self, posting: &RawPosting) -> Result<bool> {
        let apply_links = serde_json::to_string(&posting.apply_links)?;
        // The ingestion timestamp travels with the row; rows captured by an
        // older ingestion run keep their original one.
        let created_at = posting
            .created_at
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO raw_jobs
                 (job_id, title, company_name, location, description, salary_text,
                  schedule_text, posted_at, apply_links, source, share_link, thumbnail,
                  created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                posting.job_id,
                posting.title,
                posting.company_name,
                posting.location,
                posting.description,
                posting.salary_text,
                posting.schedule_text,
                posting.posted_at,
                apply_links,
                posting.source,
                posting.share_link,
                posting.thumbnail,
                created_at,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn list_raw_jobs(&self) -> Result<Vec<RawPosting>> {
        let mut stmt = self.conn.prepare(
            "SELECT job_id, title, company_name, location, description, salary_text,
                    schedule_text, posted_at, apply_links, source, share_link, thumbnail,
                    created_at
             FROM raw_jobs ORDER BY job_id",
        )?;
        let rows = stmt.query_map([], Self::row_to_posting)?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list raw jobs")
    }

    pub fn count_raw_jobs(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM raw_jobs", [], |row| row.get(0))?)
    }

    fn row_to_posting(row: &rusqlite::Row) -> rusqlite::Result<RawPosting> {
        let apply_links: String = row.get(8)?;
        Ok(RawPosting {
            job_id: row.get(0)?,
            title: row.get(1)?,
            company_name: row.get(2)?,
            location: row.get(3)?,
            description: row.get(4)?,
            salary_text: row.get(5)?,
            schedule_text: row.get(6)?,
            posted_at: row.get(7)?,
            // A mangled blob degrades to no links, not a failed run.
            apply_links: serde_json::from_str(&apply_links).unwrap_or_default(),
            source: row.get(9)?,
            share_link: row.get(10)?,
            thumbnail: row.get(11)?,
            created_at: row.get(12)?,
        })
    }

    // --- Company operations ---

    pub fn insert_company(&self, company: &RawCompany) -> Result<bool> {
        let info = company
            .info
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let created_at = company
            .created_at
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO raw_companies (company_name, info, created_at)
             VALUES (?1, ?2, ?3)",
            params![company.company_name, info, created_at],
        )?;
        Ok(changed > 0)
    }

    pub fn list_companies(&self) -> Result<Vec<RawCompany>> {
        let mut stmt = self.conn.prepare(
            "SELECT company_name, info, created_at FROM raw_companies ORDER BY company_name",
        )?;
        let rows = stmt.query_map([], |row| {
            let info: Option<String> = row.get(1)?;
            Ok(RawCompany {
                company_name: row.get(0)?,
                info: info.and_then(|i| serde_json::from_str(&i).ok()),
                created_at: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list companies")
    }

    // --- Skill taxonomy operations ---

    pub fn set_skill_config(&self, taxonomy: &SkillTaxonomy) -> Result<()> {
        let config = serde_json::to_string(&taxonomy.categories)?;
        self.conn.execute(
            "INSERT INTO skill_configs (user_id, config) VALUES (?1, ?2)
             ON CONFLICT(user_id)
             DO UPDATE SET config = excluded.config, updated_at = datetime('now')",
            params![taxonomy.user_id, config],
        )?;
        Ok(())
    }

    pub fn remove_skill_config(&self, user_id: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM skill_configs WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(changed > 0)
    }

    /// Loads every stored taxonomy. A row whose config no longer parses is
    /// reported and skipped; it must not take the run down with it.
    pub fn list_skill_configs(&self) -> Result<Vec<SkillTaxonomy>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id, config FROM skill_configs ORDER BY user_id")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut taxonomies = Vec::new();
        for row in rows {
            let (user_id, config) = row?;
            match serde_json::from_str(&config) {
                Ok(categories) => taxonomies.push(SkillTaxonomy {
                    user_id,
                    categories,
                }),
                Err(e) => eprintln!("Skipping malformed taxonomy for '{}': {}", user_id, e),
            }
        }
        Ok(taxonomies)
    }

    // --- Enriched table operations ---

    /// Replaces the whole enriched table inside one transaction. A full
    /// rewrite keeps recomputation idempotent; an aborted run rolls back to
    /// the previous complete set.
    pub fn replace_enriched(&mut self, records: &[EnrichedRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM enriched_jobs", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO enriched_jobs
                     (job_id, title, company_name, location, description, salary_text,
                      posted_at, apply_links, source, share_link, thumbnail, created_at,
                      annual_min_salary, annual_max_salary, is_salary_mentioned,
                      schedule_type, work_titles, seniority,
                      languages, bi_tools, cloud_platforms, data_modeling, found_skills,
                      sector, company_size, company_category, consulting_status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                         ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25,
                         ?26, ?27)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.job_id,
                    record.title,
                    record.company_name,
                    record.location,
                    record.description,
                    record.salary_text,
                    record.posted_at,
                    serde_json::to_string(&record.apply_links)?,
                    record.source,
                    record.share_link,
                    record.thumbnail,
                    record.created_at,
                    record.annual_min_salary,
                    record.annual_max_salary,
                    record.is_salary_mentioned,
                    record.schedule_type,
                    serde_json::to_string(&record.work_titles)?,
                    record.seniority.as_str(),
                    serde_json::to_string(&record.languages)?,
                    serde_json::to_string(&record.bi_tools)?,
                    serde_json::to_string(&record.cloud_platforms)?,
                    serde_json::to_string(&record.data_modeling)?,
                    serde_json::to_string(&record.found_skills)?,
                    record.sector,
                    record.company_size,
                    record.company_category,
                    record.consulting_status.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    pub fn list_enriched(&self, filter: &EnrichedFilter) -> Result<Vec<EnrichedRecord>> {
        let mut sql = String::from(
            "SELECT job_id, title, company_name, location, description, salary_text,
                    posted_at, apply_links, source, share_link, thumbnail, created_at,
                    annual_min_salary, annual_max_salary, is_salary_mentioned,
                    schedule_type, work_titles, seniority,
                    languages, bi_tools, cloud_platforms, data_modeling, found_skills,
                    sector, company_size, company_category, consulting_status
             FROM enriched_jobs WHERE 1=1",
        );

        let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(title) = &filter.work_title {
            // The JSON token is quoted verbatim; LIKE wildcards in the
            // user's value must not widen the match.
            sql.push_str(" AND work_titles LIKE ? ESCAPE '\\'");
            let escaped = title
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            args.push(Box::new(format!("%\"{}\"%", escaped)));
        }
        if let Some(seniority) = &filter.seniority {
            sql.push_str(" AND seniority = ?");
            args.push(Box::new(seniority.clone()));
        }
        if let Some(consulting) = &filter.consulting {
            sql.push_str(" AND consulting_status = ?");
            args.push(Box::new(consulting.clone()));
        }
        if let Some(schedule) = &filter.schedule {
            sql.push_str(" AND schedule_type = ?");
            args.push(Box::new(schedule.clone()));
        }
        if let Some(company) = &filter.company {
            sql.push_str(" AND LOWER(company_name) = LOWER(?)");
            args.push(Box::new(company.clone()));
        }
        if let Some(min) = filter.min_salary {
            sql.push_str(" AND (annual_min_salary >= ? OR annual_max_salary >= ?)");
            args.push(Box::new(min));
            args.push(Box::new(min));
        }

        sql.push_str(" ORDER BY job_id");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), Self::row_to_enriched)?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list enriched jobs")
    }

    pub fn get_enriched(&self, job_id: &str) -> Result<Option<EnrichedRecord>> {
        let result = self.conn.query_row(
            "SELECT job_id, title, company_name, location, description, salary_text,
                    posted_at, apply_links, source, share_link, thumbnail, created_at,
                    annual_min_salary, annual_max_salary, is_salary_mentioned,
                    schedule_type, work_titles, seniority,
                    languages, bi_tools, cloud_platforms, data_modeling, found_skills,
                    sector, company_size, company_category, consulting_status
             FROM enriched_jobs WHERE job_id = ?1",
            [job_id],
            Self::row_to_enriched,
        );
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn row_to_enriched(row: &rusqlite::Row) -> rusqlite::Result<EnrichedRecord> {
        let apply_links: String = row.get(7)?;
        let work_titles: String = row.get(16)?;
        let seniority: String = row.get(17)?;
        let languages: String = row.get(18)?;
        let bi_tools: String = row.get(19)?;
        let cloud_platforms: String = row.get(20)?;
        let data_modeling: String = row.get(21)?;
        let found_skills: String = row.get(22)?;
        let consulting: String = row.get(26)?;
        Ok(EnrichedRecord {
            job_id: row.get(0)?,
            title: row.get(1)?,
            company_name: row.get(2)?,
            location: row.get(3)?,
            description: row.get(4)?,
            salary_text: row.get(5)?,
            posted_at: row.get(6)?,
            apply_links: serde_json::from_str(&apply_links).unwrap_or_default(),
            source: row.get(8)?,
            share_link: row.get(9)?,
            thumbnail: row.get(10)?,
            created_at: row.get(11)?,
            annual_min_salary: row.get(12)?,
            annual_max_salary: row.get(13)?,
            is_salary_mentioned: row.get(14)?,
            schedule_type: row.get(15)?,
            work_titles: serde_json::from_str(&work_titles).unwrap_or_default(),
            seniority: Seniority::from_label(&seniority).unwrap_or(Seniority::NotSpecified),
            languages: serde_json::from_str(&languages).unwrap_or_default(),
            bi_tools: serde_json::from_str(&bi_tools).unwrap_or_default(),
            cloud_platforms: serde_json::from_str(&cloud_platforms).unwrap_or_default(),
            data_modeling: serde_json::from_str(&data_modeling).unwrap_or_default(),
            found_skills: serde_json::from_str(&found_skills).unwrap_or_default(),
            sector: row.get(23)?,
            company_size: row.get(24)?,
            company_category: row.get(25)?,
            consulting_status: ConsultingStatus::from_label(&consulting)
                .unwrap_or(ConsultingStatus::InternalPosition),
        })
    }
}
