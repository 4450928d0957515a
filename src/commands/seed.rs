//! Seed-categories command.
//!
//! Imports the category tree from a CSV file with columns
//! `name,slug,parent_slug,icon` (slug auto-generated from the name
//! when empty, parents must precede children). The import is
//! all-or-nothing per invocation.

use std::sync::Arc;

use crate::cli::args::SeedArgs;
use crate::config::Config;
use crate::domain::SystemClock;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence};
use crate::services::{CategoryManager, CategoryService, SeedRow};

/// Execute the seed-categories command
pub async fn execute(args: SeedArgs, config: Config) -> AppResult<()> {
    let rows = read_rows(&args)?;
    println!("Found {} row(s) in {}.", rows.len(), args.file.display());

    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(AppError::from)?;

    let uow = Arc::new(Persistence::new(db.get_connection()));
    let service = CategoryManager::new(uow, Arc::new(SystemClock));

    let report = service.seed(rows, args.dry_run, args.update).await?;

    if report.dry_run {
        println!("[DRY RUN] Validation passed. No data modified.");
        for label in &report.created {
            println!("  [NEW]  {}", label);
        }
        for label in &report.updated {
            println!("  [UPD]  {}", label);
        }
        for label in &report.skipped {
            println!("  [SKIP] {}", label);
        }
        return Ok(());
    }

    for label in &report.created {
        println!("  [NEW]  {}", label);
    }
    for label in &report.updated {
        println!("  [UPD]  {}", label);
    }
    for label in &report.skipped {
        println!("  [SKIP] {}", label);
    }
    println!(
        "Import complete: {} created, {} updated, {} skipped.",
        report.created.len(),
        report.updated.len(),
        report.skipped.len()
    );
    Ok(())
}

/// Parse the CSV into seed rows, trimming whitespace and generating
/// slugs from names where the column is empty.
fn read_rows(args: &SeedArgs) -> AppResult<Vec<SeedRow>> {
    if !args.file.exists() {
        return Err(AppError::validation(format!(
            "CSV file not found: {}",
            args.file.display()
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(&args.file)
        .map_err(|e| AppError::validation(format!("Failed to read CSV: {}", e)))?;

    let headers = reader
        .headers()
        .map_err(|e| AppError::validation(format!("Failed to read CSV header: {}", e)))?
        .clone();

    let field = |record: &csv::StringRecord, name: &str| -> Option<String> {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|i| record.get(i))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    if !headers.iter().any(|h| h == "name") {
        return Err(AppError::validation(
            "CSV must have at least a \"name\" column",
        ));
    }

    let mut rows = Vec::new();
    // line 1 is the header
    for (i, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| AppError::validation(format!("Line {}: {}", i + 2, e)))?;

        let name = field(&record, "name").unwrap_or_default();
        let slug = field(&record, "slug").unwrap_or_else(|| slugify(&name));

        rows.push(SeedRow {
            name,
            slug,
            parent_slug: field(&record, "parent_slug"),
            icon: field(&record, "icon"),
            line: i + 2,
        });
    }

    Ok(rows)
}

/// URL-friendly slug: lowercase ASCII alphanumerics joined by hyphens.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basics() {
        assert_eq!(slugify("Power Tools"), "power-tools");
        assert_eq!(slugify("  Cameras & Lenses  "), "cameras-lenses");
        assert_eq!(slugify("DSLR"), "dslr");
    }
}
