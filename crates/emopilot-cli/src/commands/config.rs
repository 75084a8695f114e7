use clap::Subcommand;
use emopilot_core::{Config, ConfigError};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Dot-separated key (e.g. "mission.card_count", "timing.tick_ms")
        key: String,
    },
    /// Change one setting and save it
    Set {
        /// Dot-separated key
        key: String,
        /// New value; mission values are clamped to their supported range
        value: String,
    },
    /// Print every setting as `key = value`
    List {
        /// Show the built-in defaults instead of the saved file
        #[arg(long)]
        defaults: bool,
    },
    /// Print where the config file lives
    Path,
    /// Overwrite the saved file with the built-in defaults
    Reset,
}

/// Every leaf of the config as a `(dot.path, value)` pair, sorted by key.
fn entries(config: &Config) -> Result<Vec<(String, String)>, serde_json::Error> {
    fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
        match value {
            serde_json::Value::Object(map) => {
                for (name, child) in map {
                    let path = if prefix.is_empty() {
                        name.clone()
                    } else {
                        format!("{prefix}.{name}")
                    };
                    walk(&path, child, out);
                }
            }
            serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
            leaf => out.push((prefix.to_string(), leaf.to_string())),
        }
    }

    let mut out = Vec::new();
    walk("", &serde_json::to_value(config)?, &mut out);
    Ok(out)
}

fn get(key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let value = config
        .get(key)
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    println!("{value}");
    Ok(())
}

fn set(key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    let before = config.get(key);
    config.set(key, value)?;
    config.save()?;

    let stored = config.get(key).unwrap_or_else(|| value.to_string());
    tracing::debug!(key, ?before, %stored, "config updated");
    if stored != value {
        eprintln!("note: {key} stored as {stored}");
    }
    println!("{key} = {stored}");
    Ok(())
}

fn list(defaults: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = if defaults {
        Config::default()
    } else {
        Config::load()?
    };
    for (key, value) in entries(&config)? {
        println!("{key} = {value}");
    }
    Ok(())
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => get(&key),
        ConfigAction::Set { key, value } => set(&key, &value),
        ConfigAction::List { defaults } => list(defaults),
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
            Ok(())
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
            Ok(())
        }
    }
}
