//! Freedesktop application discovery.
//!
//! Scans the XDG `applications` directories for `.desktop` files. Every
//! directory is read (no recursion) and each absolute file path is parsed at
//! most once per scan.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};

use super::desktop_entry::parse_desktop_file;
use super::{sort_applications, ScanOutcome, XdgDirs};
use crate::error::SiftError;
use crate::services::icons::IconResolver;

/// Snap exports its desktop files outside the XDG data dirs.
const SNAP_APPLICATIONS: &str = "/var/lib/snapd/desktop/applications";

const DESKTOP_SUFFIX: &str = ".desktop";

/// Scanner for `.desktop` entry files.
#[derive(Debug, Clone)]
pub struct DesktopScanner {
    dirs: Vec<PathBuf>,
    icons: Arc<IconResolver>,
}

impl DesktopScanner {
    /// Scan exactly `dirs`, in order.
    pub fn new(dirs: Vec<PathBuf>, icons: Arc<IconResolver>) -> Self {
        Self { dirs, icons }
    }

    /// Scan the standard XDG application directories.
    pub fn from_xdg(xdg: &XdgDirs, icons: Arc<IconResolver>) -> Self {
        Self::new(application_directories(xdg), icons)
    }

    /// Discover applications, sorted into catalog order.
    pub fn scan(&self) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        let mut seen: HashSet<PathBuf> = HashSet::new();

        for dir in &self.dirs {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => {
                    outcome.failures.push(SiftError::ReadDir {
                        path: dir.clone(),
                        source,
                    });
                    continue;
                }
            };

            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(source) => {
                        outcome.failures.push(SiftError::ReadDir {
                            path: dir.clone(),
                            source,
                        });
                        continue;
                    }
                };

                if entry.file_type().is_ok_and(|t| t.is_dir()) {
                    continue;
                }
                let file_name = entry.file_name();
                if !file_name.as_encoded_bytes().ends_with(DESKTOP_SUFFIX.as_bytes()) {
                    continue;
                }

                let path = dir.join(&file_name);
                if !seen.insert(path.clone()) {
                    continue;
                }

                match parse_desktop_file(&path, &self.icons) {
                    Ok(Some(app)) => outcome.apps.push(app),
                    Ok(None) => debug!("Skipping unlisted entry {}", path.display()),
                    Err(e) => outcome.failures.push(e),
                }
            }
        }

        sort_applications(&mut outcome.apps);
        info!(
            "Indexed {} applications from {} directories",
            outcome.apps.len(),
            self.dirs.len()
        );
        outcome
    }
}

/// Application directories in precedence order.
pub fn application_directories(xdg: &XdgDirs) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if let Some(data_home) = &xdg.data_home {
        dirs.push(data_home.join("applications"));
    }

    for data_dir in &xdg.data_dirs {
        dirs.push(data_dir.join("applications"));
    }

    dirs.push(PathBuf::from(SNAP_APPLICATIONS));
    dirs
}
