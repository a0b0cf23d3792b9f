use clap::{Args, Subcommand};
use sqlx::SqlitePool;
use std::fs;
use std::path::{Path, PathBuf};

use super::confirm;
use weekplan::db::CatalogRepository;
use weekplan_core::DataExport;

#[derive(Args)]
pub struct DataCommand {
    #[command(subcommand)]
    pub command: DataSubcommand,
}

#[derive(Subcommand)]
pub enum DataSubcommand {
    /// Write every collection to a JSON document
    Export {
        /// Output file (defaults to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace all data with the contents of an export document
    Import {
        /// Export document to read
        file: PathBuf,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl DataCommand {
    pub async fn run(&self, pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
        let repo = CatalogRepository::new(pool.clone());

        match &self.command {
            DataSubcommand::Export { output } => {
                let export = repo.load().await?.into_export();
                let json = serde_json::to_string_pretty(&export)?;

                match output {
                    Some(path) => {
                        fs::write(path, json)?;
                        eprintln!(
                            "Exported {} recipe(s), {} pattern(s) to {}",
                            export.recipes.len(),
                            export.patterns.len(),
                            path.display()
                        );
                    }
                    None => println!("{}", json),
                }
                Ok(())
            }

            DataSubcommand::Import { file, force } => {
                let data = read_export(file)?;

                if !force
                    && !confirm("Importing will replace ALL existing data. Continue?")?
                {
                    println!("Import cancelled.");
                    return Ok(());
                }

                repo.replace_all(&data).await?;
                println!(
                    "Imported {} ingredient(s), {} recipe(s), {} pattern(s), {} customized week(s)",
                    data.ingredients.len(),
                    data.recipes.len(),
                    data.patterns.len(),
                    data.week_overrides.len()
                );
                Ok(())
            }
        }
    }
}

/// Parse and validate an export document before anything is replaced.
fn read_export(path: &Path) -> Result<DataExport, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let data: DataExport = serde_json::from_str(&content)
        .map_err(|e| format!("{} is not a valid export document: {}", path.display(), e))?;
    data.validate()?;
    Ok(data)
}
