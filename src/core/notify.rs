use crate::core::{EmailTemplate, Kind, Notifier, Record};
use std::sync::Arc;

/// Operator addresses. Each kind resolves its alert recipient through a
/// fallback chain over these.
#[derive(Debug, Clone, Default)]
pub struct Recipients {
    pub admin: Option<String>,
    pub contact: Option<String>,
    pub school: Option<String>,
    pub tour: Option<String>,
    pub forum: Option<String>,
}

impl Recipients {
    pub fn operator_for(&self, kind: Kind) -> Option<&str> {
        let admin = self.admin.as_deref();
        let contact = self.contact.as_deref();
        let chain = match kind {
            Kind::School => [self.school.as_deref(), admin, contact],
            Kind::Tour => [self.tour.as_deref(), admin, contact],
            Kind::Forum => [self.forum.as_deref(), admin, contact],
            Kind::Contact => [contact, admin, None],
            Kind::Marketplace | Kind::Membership | Kind::Product => [admin, contact, None],
        };

        chain
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|addr| !addr.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Skipped,
    Failed(String),
}

/// Outcome of the two notifications for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub confirmation: Delivery,
    pub alert: Delivery,
}

/// Sends the submitter confirmation and the operator alert.
///
/// Never fails: the record is already stored, so delivery problems are
/// logged and reported, not propagated.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    recipients: Recipients,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, recipients: Recipients) -> Self {
        Self {
            notifier,
            recipients,
        }
    }

    pub async fn dispatch(&self, kind: Kind, record: &Record) -> DispatchReport {
        let confirmation = match record.field_str("email") {
            Some(address) => {
                self.send(EmailTemplate::Confirmation(kind), &address, record)
                    .await
            }
            None => {
                tracing::debug!("{} submission has no email, skipping confirmation", kind);
                Delivery::Skipped
            }
        };

        let alert = match self.recipients.operator_for(kind) {
            Some(address) => self.send(EmailTemplate::Alert(kind), address, record).await,
            None => {
                tracing::warn!("No operator address configured for {} alerts", kind);
                Delivery::Skipped
            }
        };

        DispatchReport {
            confirmation,
            alert,
        }
    }

    async fn send(&self, template: EmailTemplate, recipient: &str, record: &Record) -> Delivery {
        match self.notifier.notify(template, recipient, record).await {
            Ok(()) => {
                tracing::debug!("📧 {:?} sent to {}", template, recipient);
                Delivery::Sent
            }
            Err(e) => {
                tracing::warn!(
                    "Email error ({}): {:?} to {} failed: {}",
                    template.kind(),
                    template,
                    recipient,
                    e
                );
                Delivery::Failed(e.to_string())
            }
        }
    }
}
