//! Tool configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Operator-facing lexplan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexplanConfig {
    /// Directory the progress snapshots live under.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    /// Directory generated daily plans are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("./lexplan-state")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./lexplan-output")
}

impl Default for LexplanConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            output_dir: default_output_dir(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `lexplan.toml` in the current directory
/// 2. `~/.config/lexplan/config.toml`
pub fn load_config_from(path: Option<&Path>) -> Result<LexplanConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("lexplan.toml");
        if local.exists() {
            Some(local)
        } else if let Some(dir) = config_dir() {
            let global = dir.join("config.toml");
            global.exists().then_some(global)
        } else {
            None
        }
    };

    match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))
        }
        None => Ok(LexplanConfig::default()),
    }
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("lexplan"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = LexplanConfig::default();
        assert_eq!(config.state_dir, PathBuf::from("./lexplan-state"));
        assert_eq!(config.output_dir, PathBuf::from("./lexplan-output"));
    }

    #[test]
    fn parse_config() {
        let toml_str = r#"
state_dir = "/var/lib/lexplan"
output_dir = "./plans-out"
"#;
        let config: LexplanConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.state_dir, PathBuf::from("/var/lib/lexplan"));
        assert_eq!(config.output_dir, PathBuf::from("./plans-out"));
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: LexplanConfig = toml::from_str(r#"state_dir = "s""#).unwrap();
        assert_eq!(config.state_dir, PathBuf::from("s"));
        assert_eq!(config.output_dir, PathBuf::from("./lexplan-output"));
    }

    #[test]
    fn missing_explicit_config_errors() {
        assert!(load_config_from(Some(Path::new("no_such_file.toml"))).is_err());
    }
}
