//! Catalog assembly: merge every application source into one sorted list.

use std::path::PathBuf;
use std::sync::Arc;

use log::info;

use crate::config::LinkConfig;
use crate::error::ScanError;
use crate::executor::PLUGIN_PREFIX;
use crate::platform::linux::DesktopScanner;
use crate::platform::macos::BundleScanner;
use crate::platform::{sort_applications, Application, ScanOutcome};
use crate::services::icons::IconResolver;

/// A command registered at runtime by a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub id: String,
    pub name: String,
    pub icon_path: Option<PathBuf>,
}

/// Everything that can contribute records to the catalog.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    DesktopEntries(DesktopScanner),
    AppBundles(BundleScanner),
    /// Configured bookmarks; icons are looked up in `icons` without context.
    Links {
        links: Vec<LinkConfig>,
        icons: Arc<IconResolver>,
    },
    Commands(Vec<CommandInfo>),
}

impl CatalogSource {
    pub fn collect(&self) -> ScanOutcome {
        match self {
            CatalogSource::DesktopEntries(scanner) => scanner.scan(),
            CatalogSource::AppBundles(scanner) => scanner.scan(),
            CatalogSource::Links { links, icons } => ScanOutcome {
                apps: links.iter().map(|link| link_application(link, icons)).collect(),
                failures: Vec::new(),
            },
            CatalogSource::Commands(commands) => ScanOutcome {
                apps: commands.iter().map(command_application).collect(),
                failures: Vec::new(),
            },
        }
    }
}

fn plugin_token(id: &str) -> String {
    format!("{}{}", PLUGIN_PREFIX, id)
}

fn link_application(link: &LinkConfig, icons: &IconResolver) -> Application {
    let token = plugin_token(&link.id());
    let icon_name = link.icon.clone().filter(|icon| !icon.trim().is_empty());
    let icon_path = icon_name
        .as_deref()
        .and_then(|icon| icons.resolve(icon, None));

    Application {
        name: link.name.trim().to_string(),
        exec: token.clone(),
        icon_name,
        icon_path,
        path: PathBuf::from(token),
    }
}

fn command_application(command: &CommandInfo) -> Application {
    let token = plugin_token(&command.id);
    Application {
        name: command.name.clone(),
        exec: token.clone(),
        icon_name: None,
        icon_path: command.icon_path.clone(),
        path: PathBuf::from(token),
    }
}

/// The merged, sorted application list for one session.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    apps: Vec<Application>,
}

impl Catalog {
    /// Collect every source and merge the results.
    ///
    /// Returns the catalog even when some items failed; the failures come
    /// back as one aggregate error.
    pub fn build(sources: &[CatalogSource]) -> (Self, Option<ScanError>) {
        let mut apps = Vec::new();
        let mut failures = Vec::new();

        for source in sources {
            let outcome = source.collect();
            apps.extend(outcome.apps);
            failures.extend(outcome.failures);
        }

        sort_applications(&mut apps);
        let error = ScanError::from_failures(failures);
        info!(
            "Catalog built: {} entries from {} sources ({} failures)",
            apps.len(),
            sources.len(),
            error.as_ref().map_or(0, ScanError::len)
        );

        (Self { apps }, error)
    }

    pub fn apps(&self) -> &[Application] {
        &self.apps
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Ranked matches for `query`.
    pub fn filter(&self, query: &str) -> Vec<Application> {
        crate::core::search::filter(&self.apps, query)
    }
}
