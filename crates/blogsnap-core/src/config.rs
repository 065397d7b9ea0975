use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetcher::{FetchOptions, DEFAULT_USER_AGENT};
use crate::rewrite::{RewriteRule, RuleSet};
use crate::url_model::Normalizer;

/// Global configuration loaded from `~/.config/blogsnap/config.toml`.
/// Missing keys take their default; relative directories resolve against the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogsnapConfig {
    /// Site origin that root-relative URLs resolve against.
    pub origin: String,
    /// Raw HTML corpus (read-only input).
    pub html_dir: PathBuf,
    /// Asset store root; also holds the list files and the ledger.
    pub assets_dir: PathBuf,
    /// Where `localize` writes rewritten pages.
    pub output_dir: PathBuf,
    /// Fetch worker threads.
    pub threads: usize,
    /// Connect timeout and stall timeout per request, in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Applied in order after URL mapping during `localize`.
    pub rewrite_rules: Vec<RewriteRule>,
}

impl Default for BlogsnapConfig {
    fn default() -> Self {
        Self {
            origin: "https://blog.goo.ne.jp".to_string(),
            html_dir: PathBuf::from("raw_html"),
            assets_dir: PathBuf::from("assets"),
            output_dir: PathBuf::from("local_html"),
            threads: 10,
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rewrite_rules: Vec::new(),
        }
    }
}

impl BlogsnapConfig {
    /// Checks everything that would otherwise fail mid-run.
    pub fn validate(&self) -> Result<()> {
        self.normalizer()?;
        self.rule_set()?;
        if self.threads == 0 {
            anyhow::bail!("threads must be at least 1");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn normalizer(&self) -> Result<Normalizer> {
        Normalizer::new(&self.origin).context("invalid origin in config")
    }

    pub fn rule_set(&self) -> Result<RuleSet> {
        RuleSet::compile(&self.rewrite_rules)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("blogsnap")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BlogsnapConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] for an explicit location.
pub fn load_or_init_at(path: &Path) -> Result<BlogsnapConfig> {
    if !path.exists() {
        let default_cfg = BlogsnapConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(path)
}

/// Load and validate an existing config file.
pub fn load_from_path(path: &Path) -> Result<BlogsnapConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: BlogsnapConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = BlogsnapConfig::default();
        assert_eq!(cfg.origin, "https://blog.goo.ne.jp");
        assert_eq!(cfg.assets_dir, PathBuf::from("assets"));
        assert_eq!(cfg.threads, 10);
        assert_eq!(cfg.timeout_secs, 10);
        assert!(cfg.rewrite_rules.is_empty());
        cfg.validate().unwrap();
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut cfg = BlogsnapConfig::default();
        cfg.rewrite_rules.push(RewriteRule {
            pattern: "/assets/([^/]+)/assets/".to_string(),
            replacement: "/assets/".to_string(),
        });
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: BlogsnapConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_partial_uses_defaults() {
        let toml = r#"
            origin = "https://blog.example.com/"
            threads = 4

            [[rewrite_rules]]
            pattern = "/img/old/"
            replacement = "/img/"
        "#;
        let cfg: BlogsnapConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.threads, 4);
        assert_eq!(cfg.timeout_secs, 10);
        assert_eq!(cfg.html_dir, PathBuf::from("raw_html"));
        assert_eq!(cfg.rewrite_rules.len(), 1);
        assert_eq!(cfg.normalizer().unwrap().origin(), "https://blog.example.com");
        assert_eq!(cfg.fetch_options().timeout, Duration::from_secs(10));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let cfg = BlogsnapConfig {
            origin: "blog.example.com".to_string(),
            ..BlogsnapConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = BlogsnapConfig {
            rewrite_rules: vec![RewriteRule {
                pattern: "[".to_string(),
                replacement: String::new(),
            }],
            ..BlogsnapConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = BlogsnapConfig {
            threads: 0,
            ..BlogsnapConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_or_init_at_creates_then_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let created = load_or_init_at(&path).unwrap();
        assert!(path.is_file());
        fs::write(&path, "threads = 3\n").unwrap();
        let loaded = load_or_init_at(&path).unwrap();
        assert_eq!(loaded.threads, 3);
        assert_eq!(loaded.origin, created.origin);
    }

    #[test]
    fn load_from_path_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "threads = \"many\"\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parse config"));
    }
}
