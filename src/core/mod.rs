pub mod notify;
pub mod store;
pub mod submission;
pub mod templates;

pub use crate::domain::model::{Kind, Record};
pub use crate::domain::ports::{EmailTemplate, Notifier, Storage};
pub use crate::utils::error::Result;
