use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde_json::Value as JsonValue;

use super::context::CliContext;
use super::runtime::read_config_file;

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Get a configuration value by dotted key
    Get {
        /// Configuration key, e.g. `agent.max_steps`
        key: String,
    },

    /// Validate the configuration file and the effective configuration
    Validate,
}

pub async fn cmd_config(args: ConfigArgs, ctx: &CliContext) -> Result<()> {
    let path = ctx.config_path();
    match args.action {
        ConfigAction::Show => {
            println!("# Effective configuration ({})", path.display());
            print!("{}", serde_yaml::to_string(ctx.config())?);
        }
        ConfigAction::Get { key } => {
            let json = serde_json::to_value(ctx.config())?;
            let segments = split_key(&key)?;
            match get_json_value(&json, &segments) {
                Some(value) => print!("{}", serde_yaml::to_string(value)?),
                None => bail!("{} not found in configuration", key),
            }
        }
        ConfigAction::Validate => {
            match read_config_file(path).await? {
                Some(_) => println!("Configuration file {} is valid", path.display()),
                None => println!(
                    "No configuration file at {}; defaults are valid",
                    path.display()
                ),
            }
            ctx.config().validate()?;
        }
    }

    Ok(())
}

fn split_key(key: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = key
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.is_empty() {
        bail!("configuration key cannot be empty");
    }
    Ok(segments)
}

fn get_json_value<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    let mut current = value;
    for segment in path {
        match current {
            JsonValue::Object(map) => {
                current = map.get(*segment)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn nested_keys_resolve() {
        let json = serde_json::to_value(Config::default()).unwrap();
        let value = get_json_value(&json, &split_key("agent.max_steps").unwrap()).unwrap();
        assert_eq!(value.as_u64(), Some(5));
        assert!(get_json_value(&json, &["agent", "nope"]).is_none());
        assert!(get_json_value(&json, &["agent", "max_steps", "deeper"]).is_none());
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(split_key("..").is_err());
    }
}
