use std::path::Path;

use anyhow::Context as _;
use tracing::instrument;

use super::{Context, terminal::Colorize};

/// Command arguments for `jobs config`.
#[derive(Debug, clap::Parser)]
#[command(about = "Show or modify configuration settings")]
pub struct Config {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Print a single configuration value
    Get {
        /// Configuration key to print
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,

        /// Value to set
        value: String,
    },

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Config {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let path = context.config_path.as_path();

        match self.command {
            ConfigCommand::Show => {
                let config = context.config()?;

                println!("Configuration ({}):", path.display());
                for key in jobboard::Config::KEYS {
                    let value = config.get(key).unwrap_or_default();
                    if key == "base_url" && context.base_url.is_some() {
                        println!("  {key}: {value} {}", "(overridden)".dim());
                    } else {
                        println!("  {key}: {value}");
                    }
                }
            }
            ConfigCommand::Get { key } => {
                let config = context.config()?;
                let Some(value) = config.get(&key) else {
                    anyhow::bail!(
                        "Unknown configuration key: {key}\nValid keys: {}",
                        jobboard::Config::KEYS.join(", ")
                    );
                };
                println!("{value}");
            }
            ConfigCommand::Set { key, value } => {
                let mut config = load(path)?;
                config.set(&key, &value)?;
                config
                    .save(path)
                    .with_context(|| format!("failed to write {}", path.display()))?;

                println!("{}", format!("✅ Set {key} = {value}").success());
            }
            ConfigCommand::Init { force } => {
                if path.exists() && !force {
                    anyhow::bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }
                jobboard::Config::default()
                    .save(path)
                    .with_context(|| format!("failed to write {}", path.display()))?;

                println!("Created {}", path.display());
            }
        }
        Ok(())
    }
}

/// The configuration file as stored, ignoring command-line overrides.
fn load(path: &Path) -> anyhow::Result<jobboard::Config> {
    jobboard::Config::load_or_default(path)
        .with_context(|| format!("failed to load {}", path.display()))
}
