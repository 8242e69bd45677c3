use clap::Subcommand;

use super::config::ConfigArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run the agent once against a local page
    Run(RunArgs),

    /// Inspect configuration
    Config(ConfigArgs),

    /// Show build and configuration information
    Info,
}
