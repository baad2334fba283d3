use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{SiftError, SiftResult};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SIFT_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub links: Vec<LinkConfig>,
}

/// A bookmark shown in the catalog next to installed applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// Substring of `url` replaced by the user's (encoded) input. When unset
    /// the URL opens immediately.
    #[serde(default)]
    pub replacement: Option<String>,
}

impl LinkConfig {
    /// Id used in the link's `plugin:` token.
    pub fn id(&self) -> String {
        format!("link-{}", slugify(&self.name))
    }

    pub fn needs_input(&self) -> bool {
        self.replacement().is_some()
    }

    fn replacement(&self) -> Option<&str> {
        self.replacement
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    /// The URL to open for `input`; `None` when input is required but blank.
    pub fn resolve_url(&self, input: Option<&str>) -> Option<String> {
        let Some(replacement) = self.replacement() else {
            return Some(self.url.clone());
        };

        let input = input.map(str::trim).filter(|i| !i.is_empty())?;
        Some(self.url.replace(replacement, &urlencoding::encode(input)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Results printed by `sift search`
    pub max_results: u32,
    pub include_links: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            max_results: 20,
            include_links: true,
        }
    }
}

/// Lowercase ASCII letters and digits, everything else becomes `-`.
pub fn slugify(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect::<String>()
        .trim_matches('-')
        .to_string()
}

impl Config {
    /// Candidate config files, most specific first.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(explicit) = std::env::var(CONFIG_ENV) {
            if !explicit.is_empty() {
                paths.push(PathBuf::from(explicit));
            }
        }
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join("sift.toml"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("sift").join("config.toml"));
        }
        paths.push(PathBuf::from("/etc/sift/config.toml"));

        paths
    }

    /// First candidate that is an existing file.
    pub fn config_path() -> Option<PathBuf> {
        Self::candidate_paths().into_iter().find(|p| p.is_file())
    }

    /// Load config from the first candidate file, or return defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            debug!("No config file found, using defaults");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load and validate a specific file.
    pub fn load_from(path: &Path) -> SiftResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Clamp values and drop unusable links.
    fn validate(&mut self) -> SiftResult<()> {
        self.behavior.max_results = self.behavior.max_results.clamp(1, 200);

        self.links.retain(|link| {
            let keep = !link.name.trim().is_empty() && !link.url.trim().is_empty();
            if !keep {
                warn!("Ignoring link without name or url: {:?}", link);
            }
            keep
        });

        for link in &mut self.links {
            if let Some(icon) = &link.icon {
                let expanded = shellexpand::tilde(icon).into_owned();
                link.icon = Some(expanded);
            }
        }

        let mut ids: Vec<String> = self.links.iter().map(LinkConfig::id).collect();
        ids.sort();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(SiftError::Config(format!(
                "duplicate link id '{}'",
                pair[0]
            )));
        }

        Ok(())
    }

    /// Links that should be merged into the catalog.
    pub fn catalog_links(&self) -> Vec<LinkConfig> {
        if self.behavior.include_links {
            self.links.clone()
        } else {
            Vec::new()
        }
    }
}
