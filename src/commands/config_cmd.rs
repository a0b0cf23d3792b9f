use clap::{Args, Subcommand};

use super::OutputFormat;
use weekplan::config::{Config, ConfigValue};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        print_value(
                            "database_path",
                            &config.database_path.value.display(),
                            &config.database_path,
                        );
                        print_value("server.port", &config.server.port.value, &config.server.port);
                        print_value("server.bind", &config.server.bind.value, &config.server.bind);
                    }
                }
                Ok(())
            }
        }
    }
}

fn print_value<T>(key: &str, shown: &dyn std::fmt::Display, value: &ConfigValue<T>) {
    println!("{}: {}", key, shown);
    println!("  source: {}", value.source);
    println!();
}
