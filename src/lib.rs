pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{LocalStorage, LogNotifier, RelayNotifier};
pub use config::SiteConfig;
pub use crate::core::store::{StoreLayout, SubmissionStore};
pub use crate::core::submission::SubmissionService;
pub use domain::model::{Kind, Record};
pub use utils::error::{Result, SiteError};
