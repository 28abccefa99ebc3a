//! `phasetree.toml` loading
//!
//! An explicit `--config` path wins. Otherwise the working directory and its
//! ancestors are searched for `phasetree.toml`. No file means defaults; a
//! file that exists but does not parse is an error.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use phasetree_check::CheckConfig;
use phasetree_core::DelayPolicy;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "phasetree.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub validation: CheckConfig,
    pub delay: DelayPolicy,
}

/// Parse and validate config from a TOML string
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents).context("invalid phasetree config")?;
    if config.validation.weight_cap <= 0 {
        bail!(
            "validation.weight_cap must be positive (got {})",
            config.validation.weight_cap
        );
    }
    Ok(config)
}

fn load_from_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config =
        parse_config(&contents).with_context(|| format!("in config file {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// `start` followed by its parents, at most `max_depth` entries
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Resolve the effective config.
///
/// `explicit` must exist; the ancestor search starting at `search_from` only
/// applies when it is `None`.
pub fn load_config(explicit: Option<&Path>, search_from: &Path) -> Result<Config> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }

    let found = directory_ancestors(search_from.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|path| path.is_file());

    match found {
        Some(path) => load_from_path(&path),
        None => {
            debug!(
                depth = MAX_TRAVERSAL_DEPTH,
                "no {CONFIG_FILE_NAME} found, using defaults"
            );
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasetree_core::DelayBoundary;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.validation.weight_cap, 100);
        assert_eq!(config.delay.boundary, DelayBoundary::Inclusive);
        assert!(config.delay.legacy_duration_fallback);
    }

    #[test]
    fn full_config() {
        let config = parse_config(
            r#"
            [validation]
            weight_cap = 120

            [delay]
            boundary = "strict"
            legacy_duration_fallback = false
            "#,
        )
        .unwrap();

        assert_eq!(config.validation.weight_cap, 120);
        assert_eq!(config.delay.boundary, DelayBoundary::Strict);
        assert!(!config.delay.legacy_duration_fallback);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = parse_config("[delay]\nboundary = \"strict\"\n").unwrap();
        assert_eq!(config.delay.boundary, DelayBoundary::Strict);
        assert!(config.delay.legacy_duration_fallback);
        assert_eq!(config.validation, CheckConfig::default());
    }

    #[test]
    fn rejects_unknown_sections_and_bad_values() {
        assert!(parse_config("[render]\nwidth = 3\n").is_err());
        assert!(parse_config("[delay]\nboundary = \"sometimes\"\n").is_err());
        assert!(parse_config("[validation]\nweight_cap = 0\n").is_err());
    }

    #[test]
    fn ancestors_are_bounded() {
        let dirs: Vec<PathBuf> = directory_ancestors(PathBuf::from("/a/b/c"), 2).collect();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c"), PathBuf::from("/a/b")]);
    }

    #[test]
    fn finds_config_in_parent_directory() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("plans/2024");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            root.path().join(CONFIG_FILE_NAME),
            "[validation]\nweight_cap = 90\n",
        )
        .unwrap();

        let config = load_config(None, &nested).unwrap();
        assert_eq!(config.validation.weight_cap, 90);
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn broken_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "weight_cap = [").unwrap();
        assert!(load_config(None, dir.path()).is_err());
    }
}
