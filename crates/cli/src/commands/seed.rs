//! Seed the database with people from a YAML file.
//!
//! The file holds a `people` list whose entries use the same camelCase fields
//! as the create endpoint:
//!
//! ```yaml
//! people:
//!   - personType: EM
//!     firstName: Ken
//!     lastName: Sánchez
//!     emailAddresses: [ken0@example.com]
//! ```
//!
//! Each person goes through the same create path as `PUT /api/people/{id}`.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info, warn};

use people_api::config::{ApiConfig, ConfigError};
use people_api::db::{self, PeopleRepository, RepositoryError};
use people_api::models::CreatePersonInput;

/// Top-level layout of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    /// People to create, in file order.
    pub people: Vec<CreatePersonInput>,
}

/// Counts reported after a seed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    /// People inserted by this run.
    pub created: usize,
    /// People left alone because the name already existed.
    pub skipped: usize,
}

/// Errors that can occur while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to create {name}: {source}")]
    Create {
        name: String,
        #[source]
        source: RepositoryError,
    },
}

/// Create every person in `path`.
///
/// The file is parsed and validated before connecting. With `skip_existing`,
/// people whose first and last name already exist are left alone.
///
/// # Errors
///
/// Returns `SeedError` if the file cannot be read or fails validation, the
/// database is unreachable, or a create fails. People created before the
/// failure stay in the database.
pub async fn people(path: &Path, skip_existing: bool) -> Result<SeedSummary, SeedError> {
    let config = ApiConfig::from_env()?;

    info!(path = %path.display(), "Loading people from file");

    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    info!(people = seed.people.len(), "Parsed seed file");

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()));
    }

    let pool = db::create_pool(&config.database_url, &config.database).await?;
    info!("Connected to database");

    let repo = PeopleRepository::new(&pool);
    let mut summary = SeedSummary::default();

    for person in &seed.people {
        let name = format!("{} {}", person.first_name, person.last_name);

        if skip_existing {
            let existing = repo
                .find_by_name(&person.first_name, &person.last_name)
                .await
                .map_err(|source| SeedError::Create {
                    name: name.clone(),
                    source,
                })?;
            if let Some(id) = existing {
                warn!(%name, person_id = %id, "Person already exists, skipping");
                summary.skipped += 1;
                continue;
            }
        }

        let id = repo
            .create(person)
            .await
            .map_err(|source| SeedError::Create {
                name: name.clone(),
                source,
            })?;
        info!(%name, person_id = %id, "Created person");
        summary.created += 1;
    }

    info!("Seeding complete!");
    info!("  People created: {}", summary.created);
    info!("  People skipped (already exist): {}", summary.skipped);

    Ok(summary)
}

/// Check a seed file for values the database would reject.
fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();

    for (index, person) in seed.people.iter().enumerate() {
        let entry = index + 1;
        if person.first_name.trim().is_empty() {
            errors.push(format!("person {entry}: firstName is blank"));
        }
        if person.last_name.trim().is_empty() {
            errors.push(format!("person {entry}: lastName is blank"));
        }
        for card in person.credit_cards.iter().flatten() {
            if !(1..=12).contains(&card.exp_month) {
                errors.push(format!(
                    "person {entry}: credit card {} has expMonth {}",
                    card.credit_card_id, card.exp_month
                ));
            }
        }
    }

    errors
}
