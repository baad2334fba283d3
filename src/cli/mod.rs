//! Command-line interface for sift.
//!
//! Subcommands build the catalog once and then list, rank, explain or
//! launch entries from it. `icon` only consults the icon resolver.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::{debug, warn};

use crate::config::Config;
use crate::core::search::{debug_score, score_entries};
use crate::executor::{execute, ExecutionAction};
use crate::platform::{self, Application, XdgDirs};
use crate::services::catalog::{Catalog, CatalogSource};
use crate::services::icons::IconResolver;

#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Find and launch installed applications", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of the default lookup
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print every catalog entry
    List {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Rank catalog entries against a query
    Search {
        query: String,

        /// Maximum number of results (default: behavior.max_results)
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Show where an icon identifier resolves to
    Icon {
        name: String,

        /// Resolve relative to this .desktop file
        #[arg(long, value_name = "FILE")]
        desktop: Option<PathBuf>,
    },

    /// Explain how an entry scores for a query
    Score {
        query: String,

        /// Entry name (case-insensitive)
        name: String,

        /// Match NAME against the exec string instead
        #[arg(long)]
        exec: bool,
    },

    /// Launch the best match for a query
    Launch {
        query: String,

        /// Text substituted into links that take input
        #[arg(long)]
        input: Option<String>,
    },
}

/// Parse arguments and run the selected subcommand.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load(),
    };

    let xdg = XdgDirs::from_env();
    let icons = Arc::new(IconResolver::from_xdg(&xdg));

    match cli.command {
        Commands::List { json } => {
            let catalog = build_catalog(&config, &xdg, &icons);
            if json {
                println!("{}", serde_json::to_string_pretty(catalog.apps())?);
            } else {
                for app in catalog.apps() {
                    println!("{}", describe(app));
                }
            }
        }
        Commands::Search { query, limit, json } => {
            let catalog = build_catalog(&config, &xdg, &icons);
            let limit = limit.unwrap_or(config.behavior.max_results as usize);
            let entries: Vec<_> = score_entries(catalog.apps(), &query)
                .into_iter()
                .take(limit)
                .collect();

            if json {
                let apps: Vec<&Application> = entries.iter().map(|entry| entry.app).collect();
                println!("{}", serde_json::to_string_pretty(&apps)?);
            } else {
                for entry in &entries {
                    println!(
                        "{:>5}  {:<14}  {}",
                        entry.score,
                        entry.kind.as_str(),
                        describe(entry.app)
                    );
                }
            }
        }
        Commands::Icon { name, desktop } => {
            match icons.debug_resolve(&name, desktop.as_deref()) {
                Some(path) => println!("{}", path.display()),
                None => bail!("icon '{}' not found", name),
            }
        }
        Commands::Score { query, name, exec } => {
            let catalog = build_catalog(&config, &xdg, &icons);
            let wanted = name.to_lowercase();
            let matches: Vec<&Application> = catalog
                .apps()
                .iter()
                .filter(|app| {
                    let field = if exec { &app.exec } else { &app.name };
                    field.to_lowercase() == wanted
                })
                .collect();

            if matches.is_empty() {
                bail!("no catalog entry named '{}'", name);
            }
            for app in matches {
                match debug_score(app, &query) {
                    Some((kind, score)) => println!("{:>5}  {:<14}  {}", score, kind.as_str(), describe(app)),
                    None => println!("{:>5}  {:<14}  {}", 0, "no-match", describe(app)),
                }
            }
        }
        Commands::Launch { query, input } => {
            let catalog = build_catalog(&config, &xdg, &icons);
            let Some(app) = catalog.filter(&query).into_iter().next() else {
                bail!("nothing matches '{}'", query);
            };

            let action = ExecutionAction::for_application(&app, &config.links, input.as_deref())?;
            match &action {
                ExecutionAction::NeedsInput => bail!("{} needs --input", app.name),
                ExecutionAction::Plugin { id } => {
                    println!("{} is handled by plugin '{}'", app.name, id);
                }
                _ => execute(&action)?,
            }
        }
    }

    Ok(())
}

fn build_catalog(config: &Config, xdg: &XdgDirs, icons: &Arc<IconResolver>) -> Catalog {
    debug!("Building catalog for {}", platform::name());
    let sources = vec![
        platform::default_source(xdg, Arc::clone(icons)),
        CatalogSource::Links {
            links: config.catalog_links(),
            icons: Arc::clone(icons),
        },
    ];

    let (catalog, error) = Catalog::build(&sources);
    if let Some(error) = error {
        for failure in error.failures() {
            warn!("{}", failure);
        }
    }
    catalog
}

fn describe(app: &Application) -> String {
    format!("{}\t{}", app.name, app.exec)
}
