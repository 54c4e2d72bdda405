// Adapters layer: concrete implementations of the domain ports.

pub mod mail;
pub mod storage;

pub use mail::{LogNotifier, RelayNotifier};
pub use storage::LocalStorage;
