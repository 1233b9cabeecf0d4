//! Migration scaffolding
//!
//! Generates a new migration source file with a timestamp-derived version,
//! so authors never hand-write version identifiers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

/// Create a new migration stub under `dir`, returning the written path
pub fn create_migration(dir: &Path, name: &str) -> Result<PathBuf> {
    let version = Utc::now().format("%Y%m%d%H%M%S").to_string();
    create_migration_with_version(dir, name, &version)
}

pub(crate) fn create_migration_with_version(
    dir: &Path,
    name: &str,
    version: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create migrations directory {}", dir.display()))?;

    let snake = snake_case(name);
    let filename = format!("m{}_{}.rs", version, snake);
    let path = dir.join(&filename);

    let template = migration_template(&type_name(&snake), version);
    fs::write(&path, template)
        .with_context(|| format!("failed to write migration file {}", path.display()))?;

    Ok(path)
}

fn migration_template(type_name: &str, version: &str) -> String {
    format!(
        "use strata_migrate::{{Migration, MigrationResult, SchemaBuilder}};\n\
         \n\
         pub struct {type_name};\n\
         \n\
         impl Migration for {type_name} {{\n\
         \x20   fn version(&self) -> &str {{\n\
         \x20       \"{version}\"\n\
         \x20   }}\n\
         \n\
         \x20   fn up(&self, schema: &mut SchemaBuilder) -> MigrationResult<()> {{\n\
         \x20       // Declare forward statements here.\n\
         \x20       let _ = schema;\n\
         \x20       Ok(())\n\
         \x20   }}\n\
         \n\
         \x20   fn down(&self, schema: &mut SchemaBuilder) -> MigrationResult<()> {{\n\
         \x20       // Declare rollback statements here.\n\
         \x20       let _ = schema;\n\
         \x20       Ok(())\n\
         \x20   }}\n\
         }}\n"
    )
}

fn snake_case(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split(|c: char| c == ' ' || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

fn type_name(snake: &str) -> String {
    snake
        .split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
