use clap::{Args, Subcommand};

use super::OutputFormat;
use docshare::config::{Config, ConfigValue};

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

fn print_value<T: std::fmt::Display>(key: &str, value: &ConfigValue<T>) {
    println!("{}: {}", key, value.value);
    println!("  source: {}", value.source);
    println!();
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

                        println!("database_path: {}", config.database_path.value.display());
                        println!("  source: {}", config.database_path.source);
                        println!();

                        print_value("port", &config.port);
                        print_value("session_ttl_minutes", &config.session_ttl_minutes);
                        print_value("password_cost", &config.password_cost);
                        print_value("secure_cookies", &config.secure_cookies);
                    }
                }
                Ok(())
            }
        }
    }
}
