//! Inbox-first notifier with best-effort email mirroring.
//!
//! Every notification becomes a durable inbox row via the directory. When an
//! email address is known for the recipient and Mailgun is configured, a copy
//! goes out on a spawned task that is never awaited, so a slow or failing
//! email provider cannot stall a dispatch operation.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use mailgun::MailgunService;
use tracing::warn;

use super::traits::{BaseDirectory, BaseNotifier};
use crate::common::UserId;
use crate::domains::notifications::models::notification::Notification;

pub struct InboxNotifier {
    directory: Arc<dyn BaseDirectory>,
    mailer: Option<Arc<MailgunService>>,
}

impl InboxNotifier {
    /// `mailer: None` disables the email channel entirely (local dev, tests).
    pub fn new(directory: Arc<dyn BaseDirectory>, mailer: Option<Arc<MailgunService>>) -> Self {
        Self { directory, mailer }
    }
}

#[async_trait]
impl BaseNotifier for InboxNotifier {
    async fn notify(
        &self,
        recipient: UserId,
        contact_email: Option<&str>,
        title: &str,
        body: &str,
        category: &str,
    ) -> Result<()> {
        let notification = Notification::new(recipient, title, body, category);
        self.directory.insert_notification(&notification).await?;

        if let (Some(mailer), Some(email)) = (&self.mailer, contact_email) {
            let mailer = Arc::clone(mailer);
            let recipient = email.to_string();
            let subject = title.to_string();
            let text = body.to_string();
            tokio::spawn(async move {
                if let Err(e) = mailer.send_email(&recipient, &subject, &text).await {
                    warn!(error = %e, "Failed to send notification email");
                }
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::InMemoryDirectory;

    #[tokio::test]
    async fn notify_writes_a_durable_inbox_row() {
        let directory = Arc::new(InMemoryDirectory::new());
        let notifier = InboxNotifier::new(directory.clone(), None);
        let recipient = UserId::new();

        notifier
            .notify(
                recipient,
                Some("patient@example.com"),
                "Ambulance Request Accepted",
                "Ambulance AMB-001 accepted your request.",
                "dispatch",
            )
            .await
            .unwrap();

        let inbox = directory.notifications_for(recipient, false, 10).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].title, "Ambulance Request Accepted");
        assert!(!inbox[0].is_read);
    }

    #[tokio::test]
    async fn notify_fails_when_the_inbox_write_fails() {
        let directory = Arc::new(InMemoryDirectory::failing());
        let notifier = InboxNotifier::new(directory, None);

        let result = notifier
            .notify(UserId::new(), None, "Ambulance Request", "body", "dispatch")
            .await;
        assert!(result.is_err());
    }
}
