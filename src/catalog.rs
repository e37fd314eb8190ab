//! Team categories as CSV: `name,team1,team2,...` per record.

use crate::error::{Result, TournamentError};
use crate::models::TeamCategory;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors while loading a category catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: {reason}")]
    Invalid { line: u64, reason: String },
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn category_from_record(record: &csv::StringRecord) -> std::result::Result<TeamCategory, String> {
    let mut fields = record.iter().filter(|f| !f.is_empty());
    let name = fields
        .next()
        .ok_or_else(|| "the category name is missing".to_string())?;
    let mut teams: Vec<String> = Vec::new();
    for team in fields {
        if teams.iter().any(|t| t == team) {
            return Err(format!("team {team} is listed twice in {name}"));
        }
        teams.push(team.to_string());
    }
    if teams.is_empty() {
        return Err(format!("category {name} has no teams"));
    }
    Ok(TeamCategory::new(name, teams))
}

/// Parse the argument of `/add_team_category`: one record, name first.
pub fn parse_category(input: &str) -> Result<TeamCategory> {
    let mut records = reader(input.as_bytes()).into_records();
    let record = records
        .next()
        .ok_or_else(|| TournamentError::validation("expected: name,team1,team2,..."))?
        .map_err(|e| TournamentError::validation(format!("malformed category: {e}")))?;
    category_from_record(&record).map_err(TournamentError::Validation)
}

/// Read every category from a catalog; blank lines are skipped.
pub fn read_catalog<R: Read>(input: R) -> std::result::Result<Vec<TeamCategory>, CatalogError> {
    let mut categories = Vec::new();
    for record in reader(input).into_records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let category =
            category_from_record(&record).map_err(|reason| CatalogError::Invalid { line, reason })?;
        categories.push(category);
    }
    Ok(categories)
}

/// Load the catalog file configured at startup.
pub fn load_catalog(path: &Path) -> std::result::Result<Vec<TeamCategory>, CatalogError> {
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    let categories = read_catalog(file)?;
    log::info!(
        "Loaded {} team categories from {}",
        categories.len(),
        path.display()
    );
    Ok(categories)
}
