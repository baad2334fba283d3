//! Platform layer: application discovery for freedesktop desktops and
//! macOS bundles.
//!
//! Both scanners compile on every OS; [`default_source`] picks the one that
//! matches the running platform.

pub mod desktop_entry;
pub mod linux;
pub mod macos;

use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{ScanError, SiftError};
use crate::services::catalog::CatalogSource;
use crate::services::icons::IconResolver;

/// Default value for `XDG_DATA_DIRS` when the variable is unset.
pub const DEFAULT_DATA_DIRS: &str = "/usr/local/share:/usr/share";

/// Represents an installed application discovered on the system.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Application {
    /// Display name of the application
    pub name: String,
    /// Command to execute, with `%` field codes removed
    pub exec: String,
    /// Icon identifier exactly as declared
    pub icon_name: Option<String>,
    /// Resolved icon file
    pub icon_path: Option<PathBuf>,
    /// Where the entry came from (descriptor file, bundle, or `plugin:` token)
    pub path: PathBuf,
}

impl Application {
    /// Catalog ordering: case-insensitive name, then the raw exec string.
    pub fn catalog_cmp(&self, other: &Self) -> Ordering {
        self.name
            .to_lowercase()
            .cmp(&other.name.to_lowercase())
            .then_with(|| self.exec.cmp(&other.exec))
    }
}

/// Applications found by one scan plus every per-item failure.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub apps: Vec<Application>,
    pub failures: Vec<SiftError>,
}

impl ScanOutcome {
    /// Split into the (possibly partial) list and the aggregate error.
    pub fn into_parts(self) -> (Vec<Application>, Option<ScanError>) {
        (self.apps, ScanError::from_failures(self.failures))
    }
}

/// Sort applications into catalog order.
pub fn sort_applications(apps: &mut [Application]) {
    apps.sort_by(Application::catalog_cmp);
}

/// Snapshot of the XDG base directories relevant to discovery.
///
/// Captured once from the environment so that the entry scanner and the
/// icon directory list agree on the same roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XdgDirs {
    /// `$XDG_DATA_HOME`, or `~/.local/share`
    pub data_home: Option<PathBuf>,
    /// The user's home directory
    pub home: Option<PathBuf>,
    /// `$XDG_DATA_DIRS` entries in order
    pub data_dirs: Vec<PathBuf>,
}

impl XdgDirs {
    /// Read `XDG_DATA_HOME`, `XDG_DATA_DIRS` and the home directory.
    pub fn from_env() -> Self {
        let home = dirs::home_dir();
        let data_home = std::env::var("XDG_DATA_HOME").ok();
        let data_dirs = std::env::var("XDG_DATA_DIRS").ok();
        Self::from_values(home, data_home.as_deref(), data_dirs.as_deref())
    }

    /// Build from raw variable values; empty values count as unset.
    pub fn from_values(
        home: Option<PathBuf>,
        data_home: Option<&str>,
        data_dirs: Option<&str>,
    ) -> Self {
        let data_home = match data_home {
            Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
            _ => home.as_ref().map(|h| h.join(".local/share")),
        };

        let data_dirs = match data_dirs {
            Some(value) if !value.is_empty() => value,
            _ => DEFAULT_DATA_DIRS,
        };
        let data_dirs = data_dirs
            .split(':')
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .collect();

        Self {
            data_home,
            home,
            data_dirs,
        }
    }
}

/// The scanner for the current OS, wrapped as a catalog source.
pub fn default_source(xdg: &XdgDirs, resolver: Arc<IconResolver>) -> CatalogSource {
    #[cfg(target_os = "macos")]
    {
        let _ = resolver;
        CatalogSource::AppBundles(macos::BundleScanner::from_home(xdg.home.as_deref()))
    }

    #[cfg(not(target_os = "macos"))]
    {
        CatalogSource::DesktopEntries(linux::DesktopScanner::from_xdg(xdg, resolver))
    }
}

/// Platform name as a string (for logging/display).
pub fn name() -> &'static str {
    #[cfg(target_os = "linux")]
    {
        "Linux"
    }

    #[cfg(target_os = "macos")]
    {
        "macOS"
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        "Unknown"
    }
}
