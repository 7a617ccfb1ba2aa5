//! Configuration file loading for CLI defaults.
//!
//! The file holds `key = value` lines with `#` comments. Strings are
//! double-quoted; booleans are `true` / `false`.
//!
//! ```text
//! database = "/var/lib/batchq/queue.db"
//! verbosity = "verbose"
//! add_paused = true      # new turbo downloads start paused
//! last_type = "media"
//! stack_limit = 20
//! ```

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use batchq_core::{LastType, PrefDefaults};

const APP_DIR: &str = "batchq";

/// Values read from the config file. Unset keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub database: Option<PathBuf>,
    pub verbosity: Option<VerbositySetting>,
    pub add_paused: Option<bool>,
    pub queue_notification: Option<bool>,
    pub last_type: Option<LastType>,
    /// Remembered values per selection stack (1..=50).
    pub stack_limit: Option<usize>,
}

impl FileConfig {
    /// Overlays file values on the built-in preference defaults.
    #[must_use]
    pub fn pref_defaults(&self) -> PrefDefaults {
        let base = PrefDefaults::default();
        PrefDefaults {
            last_type: self.last_type.unwrap_or(base.last_type),
            add_paused: self.add_paused.unwrap_or(base.add_paused),
            queue_notification: self.queue_notification.unwrap_or(base.queue_notification),
            open_manager_on_queue: base.open_manager_on_queue,
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(limit) = self.stack_limit
            && !(1..=50).contains(&limit)
        {
            bail!("Invalid config value for `stack_limit`: {limit}. Expected range: 1..=50");
        }
        Ok(())
    }
}

/// Verbosity labels accepted in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Log filter directive for this setting.
    #[must_use]
    pub fn filter(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose | Self::Debug => "debug",
            Self::Quiet => "error",
        }
    }
}

/// `$XDG_CONFIG_HOME/batchq/config.toml`, else `$HOME/.config/batchq/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(xdg) = env_var_non_empty("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg).join(APP_DIR).join("config.toml"));
    }
    let home = env_var_non_empty("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml"),
    )
}

/// `$XDG_DATA_HOME/batchq/batchq.db`, else `$HOME/.local/share/batchq/batchq.db`,
/// else `batchq.db` in the working directory.
#[must_use]
pub fn default_database_path() -> PathBuf {
    let base = env_var_non_empty("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|| env_var_non_empty("HOME").map(|home| PathBuf::from(home).join(".local/share")));
    match base {
        Some(base) => base.join(APP_DIR).join("batchq.db"),
        None => PathBuf::from("batchq.db"),
    }
}

fn env_var_non_empty(name: &str) -> Option<OsString> {
    env::var_os(name).filter(|value| !value.is_empty())
}

/// Loads `explicit` if given, else the default path if that file exists.
///
/// A missing explicit file is an error; a missing default file is not.
pub fn load(explicit: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = explicit {
        return load_file(path);
    }
    match default_config_path() {
        Some(path) if path.exists() => load_file(&path),
        _ => Ok(FileConfig::default()),
    }
}

fn load_file(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (index, raw_line) in raw.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };
        let (key, value) = (key.trim(), value.trim());
        let context = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "database" => {
                cfg.database = Some(PathBuf::from(parse_string(value).with_context(context)?));
            }
            "verbosity" => {
                let label = parse_string(value).with_context(context)?;
                cfg.verbosity = Some(parse_verbosity(&label).with_context(context)?);
            }
            "add_paused" => cfg.add_paused = Some(parse_bool(value).with_context(context)?),
            "queue_notification" => {
                cfg.queue_notification = Some(parse_bool(value).with_context(context)?);
            }
            "last_type" => {
                let label = parse_string(value).with_context(context)?;
                let last_type = label
                    .parse::<LastType>()
                    .map_err(|reason| anyhow!(reason))
                    .with_context(context)?;
                cfg.last_type = Some(last_type);
            }
            "stack_limit" => {
                let limit = value.parse::<usize>().with_context(context)?;
                cfg.stack_limit = Some(limit);
            }
            unknown => bail!("Unknown configuration key: '{unknown}' on line {line_no}"),
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string(raw: &str) -> Result<String> {
    raw.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Expected double-quoted string"))
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}

fn parse_verbosity(label: &str) -> Result<VerbositySetting> {
    match label {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_all_keys() {
        let cfg = parse_config_str(
            r#"
database = "/tmp/q.db"
verbosity = "quiet"
add_paused = true
queue_notification = false   # silence
last_type = "media"
stack_limit = 20
"#,
        )
        .unwrap();
        assert_eq!(cfg.database, Some(PathBuf::from("/tmp/q.db")));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Quiet));
        assert_eq!(cfg.add_paused, Some(true));
        assert_eq!(cfg.queue_notification, Some(false));
        assert_eq!(cfg.last_type, Some(LastType::Media));
        assert_eq!(cfg.stack_limit, Some(20));
    }

    #[test]
    fn test_pref_defaults_overlay() {
        let cfg = parse_config_str("add_paused = true").unwrap();
        let defaults = cfg.pref_defaults();
        assert!(defaults.add_paused);
        assert!(defaults.queue_notification);
        assert_eq!(defaults.last_type, LastType::Links);
    }

    #[test]
    fn test_parse_config_rejects_stack_limit_out_of_range() {
        let err = parse_config_str("stack_limit = 0").unwrap_err();
        assert!(err.to_string().contains("stack_limit"));
        assert!(parse_config_str("stack_limit = 51").is_err());
    }

    #[test]
    fn test_parse_config_rejects_unknown_key() {
        let err = parse_config_str("concurrency = 4").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
    }

    #[test]
    fn test_parse_config_rejects_bad_values() {
        assert!(parse_config_str("add_paused = yes").is_err());
        assert!(parse_config_str("last_type = \"videos\"").is_err());
        assert!(parse_config_str("database = /no/quotes").is_err());
        assert!(parse_config_str("just a line").is_err());
    }

    #[test]
    fn test_hash_inside_string_is_not_a_comment() {
        let cfg = parse_config_str(r#"database = "/tmp/#1.db" # trailing"#).unwrap();
        assert_eq!(cfg.database, Some(PathBuf::from("/tmp/#1.db")));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "last_type = \"media\"\n").unwrap();
        assert_eq!(load(Some(&path)).unwrap().last_type, Some(LastType::Media));
        assert!(load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
