use crate::domain::model::{Kind, Record};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Byte-level persistence used by the submission store and upload writer.
///
/// Paths are relative to the backend's root.
pub trait Storage: Send + Sync {
    /// Reads a whole file; `Ok(None)` when it does not exist.
    fn read_file(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Replaces a file's contents. Readers must never observe a partial write.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Deletes a file. A file that is already gone is not an error.
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Which message to send for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    /// Sent to the person who submitted the form.
    Confirmation(Kind),
    /// Sent to the operator address for the kind.
    Alert(Kind),
}

impl EmailTemplate {
    pub fn kind(&self) -> Kind {
        match self {
            EmailTemplate::Confirmation(kind) | EmailTemplate::Alert(kind) => *kind,
        }
    }
}

/// Mail delivery capability. Implementations render the template
/// themselves and report delivery failures as `NotificationError`.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, template: EmailTemplate, recipient: &str, data: &Record) -> Result<()>;
}
