//! sift - installed-application catalog with fuzzy search.
//!
//! sift discovers applications installed on the machine (freedesktop
//! `.desktop` entries on Linux, `.app` bundles on macOS), resolves their
//! icons, merges them with configured links and plugin commands, and ranks
//! the result against a typed query.
//!
//! # Architecture
//!
//! - [`platform`] - Application discovery (desktop entries, app bundles)
//! - [`services`] - Icon resolution and catalog assembly
//! - [`core`] - Search ranking
//! - [`executor`] - Turning a chosen entry into an action
//! - [`config`] - Configuration loading
//! - [`cli`] - The `sift` command-line tool
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sift::{platform, Catalog, IconResolver, XdgDirs};
//!
//! let xdg = XdgDirs::from_env();
//! let icons = Arc::new(IconResolver::from_xdg(&xdg));
//! let (catalog, _errors) = Catalog::build(&[platform::default_source(&xdg, icons)]);
//! for app in catalog.filter("fire") {
//!     println!("{} -> {}", app.name, app.exec);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod executor;
pub mod platform;
pub mod services;

pub use config::Config;
pub use crate::core::search::filter;
pub use error::{ScanError, SiftError, SiftResult};
pub use executor::ExecutionAction;
pub use platform::{Application, XdgDirs};
pub use services::catalog::{Catalog, CatalogSource};
pub use services::icons::IconResolver;
