//! macOS application bundle discovery.
//!
//! Walks the application roots for `.app` bundles and reads each bundle's
//! `Info.plist` through a [`BundleMetadataReader`]. The default reader shells
//! out to `plutil` to convert the plist to JSON.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use log::{debug, info};
use serde_json::{Map, Value};
use walkdir::WalkDir;

use super::{sort_applications, Application, ScanOutcome};
use crate::error::{SiftError, SiftResult};

/// Key/value view of a bundle's `Info.plist`.
pub type BundleMetadata = Map<String, Value>;

/// Reads the metadata document of one bundle.
pub trait BundleMetadataReader: Send + Sync {
    fn read(&self, bundle: &Path) -> SiftResult<BundleMetadata>;
}

/// Reads `Contents/Info.plist` with `plutil -convert json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlutilReader;

impl BundleMetadataReader for PlutilReader {
    fn read(&self, bundle: &Path) -> SiftResult<BundleMetadata> {
        let info_plist = bundle.join("Contents/Info.plist");
        let fail = |message: String| SiftError::BundleMetadata {
            path: bundle.to_path_buf(),
            message,
        };

        if !info_plist.is_file() {
            return Err(fail(format!(
                "info.plist not found: {}",
                info_plist.display()
            )));
        }

        let output = Command::new("plutil")
            .args(["-convert", "json", "-o", "-"])
            .arg(&info_plist)
            .output()
            .map_err(|e| fail(format!("plutil convert {}: {}", info_plist.display(), e)))?;

        if !output.status.success() {
            return Err(fail(format!(
                "plutil convert {}: {}",
                info_plist.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        match serde_json::from_slice::<Value>(&output.stdout) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(fail(format!(
                "parse json {}: not an object",
                info_plist.display()
            ))),
            Err(e) => Err(fail(format!("parse json {}: {}", info_plist.display(), e))),
        }
    }
}

/// Scanner for `.app` bundles.
#[derive(Clone)]
pub struct BundleScanner {
    roots: Vec<PathBuf>,
    reader: Arc<dyn BundleMetadataReader>,
}

impl std::fmt::Debug for BundleScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleScanner")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl BundleScanner {
    /// Walk `roots` and read metadata with `reader`.
    pub fn new(roots: Vec<PathBuf>, reader: Arc<dyn BundleMetadataReader>) -> Self {
        Self { roots, reader }
    }

    /// The standard roots, read through `plutil`.
    pub fn from_home(home: Option<&Path>) -> Self {
        Self::new(application_roots(home), Arc::new(PlutilReader))
    }

    /// Discover bundles, sorted into catalog order.
    pub fn scan(&self) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        let mut seen: HashSet<PathBuf> = HashSet::new();

        for root in &self.roots {
            let mut walker = WalkDir::new(root).into_iter();

            while let Some(entry) = walker.next() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(source) => {
                        let path = source.path().unwrap_or(root.as_path()).to_path_buf();
                        let failure = SiftError::Walk { path, source };
                        if !failure.is_not_found() {
                            outcome.failures.push(failure);
                        }
                        continue;
                    }
                };

                if !entry.file_type().is_dir() || !is_bundle_name(entry.file_name()) {
                    continue;
                }

                // Nested bundles (helpers, plug-ins) belong to their parent
                walker.skip_current_dir();

                let bundle = entry.into_path();
                if !seen.insert(bundle.clone()) {
                    continue;
                }

                let (app, failure) = self.parse_bundle(&bundle);
                if let Some(e) = failure {
                    outcome.failures.push(e);
                }
                match app {
                    Some(app) => outcome.apps.push(app),
                    None => debug!("Dropping unnamed bundle {}", bundle.display()),
                }
            }
        }

        sort_applications(&mut outcome.apps);
        info!(
            "Indexed {} application bundles from {} roots",
            outcome.apps.len(),
            self.roots.len()
        );
        outcome
    }

    /// Build a best-effort record; a metadata failure is returned alongside it.
    fn parse_bundle(&self, bundle: &Path) -> (Option<Application>, Option<SiftError>) {
        let (metadata, failure) = match self.reader.read(bundle) {
            Ok(metadata) => (metadata, None),
            Err(e) => (BundleMetadata::new(), Some(e)),
        };

        let stem = bundle
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = first_non_blank([
            string_field(&metadata, "CFBundleDisplayName"),
            string_field(&metadata, "CFBundleName"),
            Some(stem.as_str()),
        ]);

        let Some(name) = name else {
            return (None, failure);
        };

        let icon_path = resolve_bundle_icon(bundle, &metadata);
        let icon_name = icon_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned());
        let exec = bundle.to_string_lossy().into_owned();

        let app = Application {
            name,
            exec,
            icon_name,
            icon_path,
            path: bundle.to_path_buf(),
        };
        (Some(app), failure)
    }
}

/// `/Applications`, `/System/Applications`, then `~/Applications`.
pub fn application_roots(home: Option<&Path>) -> Vec<PathBuf> {
    let mut roots = vec![
        PathBuf::from("/Applications"),
        PathBuf::from("/System/Applications"),
    ];
    if let Some(home) = home {
        roots.push(home.join("Applications"));
    }
    roots
}

fn is_bundle_name(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().to_lowercase().ends_with(".app")
}

fn string_field<'a>(metadata: &'a BundleMetadata, key: &str) -> Option<&'a str> {
    metadata.get(key).and_then(Value::as_str)
}

fn first_non_blank<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    values
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Find the `.icns` file for a bundle from its declared icon names, falling
/// back to the first `.icns` in `Contents/Resources`.
pub fn resolve_bundle_icon(bundle: &Path, metadata: &BundleMetadata) -> Option<PathBuf> {
    let resources = bundle.join("Contents/Resources");

    let mut candidates: Vec<&str> = Vec::new();
    if let Some(icon_file) = string_field(metadata, "CFBundleIconFile") {
        candidates.push(icon_file.trim());
    }
    if let Some(Value::Array(files)) = metadata.get("CFBundleIconFiles") {
        candidates.extend(files.iter().filter_map(Value::as_str).map(str::trim));
    }

    for name in candidates.into_iter().filter(|n| !n.is_empty()) {
        if Path::new(name).extension().is_none() {
            let with_ext = resources.join(format!("{}.icns", name));
            if with_ext.is_file() {
                return Some(with_ext);
            }
        }
        let direct = resources.join(name);
        if direct.is_file() {
            return Some(direct);
        }
    }

    let mut icns: Vec<PathBuf> = fs::read_dir(&resources)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("icns"))
        })
        .filter(|p| p.is_file())
        .collect();
    icns.sort();
    icns.into_iter().next()
}
