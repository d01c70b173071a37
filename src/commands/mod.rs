mod config_cmd;
mod user;

pub use config_cmd::ConfigCommand;
pub use user::UserCommand;

use clap::ValueEnum;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
