use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::{
    ConfigCommand, DataCommand, IngredientCommand, PatternCommand, RecipeCommand,
    SettingsCommand, WeekCommand,
};
use weekplan::config::Config;
use weekplan::db::{init_db, IngredientRepository, RecipeRepository};

#[derive(Parser)]
#[command(name = "weekplan")]
#[command(version)]
#[command(about = "Plan weekly meals from a rotation of patterns", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage ingredients
    Ingredient(IngredientCommand),

    /// Manage recipes
    Recipe(RecipeCommand),

    /// Manage week patterns
    Pattern(PatternCommand),

    /// Manage the pattern rotation
    Settings(SettingsCommand),

    /// View and customize a calendar week
    Week(WeekCommand),

    /// Export or import all data
    Data(DataCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("WEEKPLAN_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    let Some(command) = cli.command else {
        println!("Use --help to see available commands");
        return Ok(());
    };

    if let Commands::Config(cmd) = &command {
        return cmd.run(&config);
    }

    let pool = init_db(&config.database_path.value).await?;
    match command {
        Commands::Ingredient(cmd) => {
            cmd.run(&IngredientRepository::new(pool)).await?;
        }
        Commands::Recipe(cmd) => {
            let ingredients = IngredientRepository::new(pool.clone());
            cmd.run(&RecipeRepository::new(pool), &ingredients).await?;
        }
        Commands::Pattern(cmd) => cmd.run(&pool).await?,
        Commands::Settings(cmd) => cmd.run(&pool).await?,
        Commands::Week(cmd) => cmd.run(&pool).await?,
        Commands::Data(cmd) => cmd.run(&pool).await?,
        Commands::Config(_) => {}
    }

    Ok(())
}
