use std::{path::PathBuf, sync::Arc};

use tracing::info;

use models::contact::ContactMessage;

use crate::errors::ServiceError;
use crate::storage::json_list_store::JsonListStore;

/// Append-only log of contact-form submissions.
#[derive(Clone)]
pub struct ContactLog {
    store: Arc<JsonListStore<ContactMessage>>,
}

impl ContactLog {
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonListStore::<ContactMessage>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }

    /// Validate and append a message. Messages carry no identity and are
    /// never deduplicated.
    pub async fn record(&self, message: ContactMessage) -> Result<(), ServiceError> {
        message.validate()?;
        self.store.push(message.clone()).await?;
        info!(from = %message.email, "contact message recorded");
        Ok(())
    }

    /// All messages in arrival order.
    pub async fn list(&self) -> Vec<ContactMessage> {
        self.store.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn msg(name: &str) -> ContactMessage {
        ContactMessage {
            name: name.into(),
            email: format!("{name}@example.com"),
            message: "Is the Corolla still available?".into(),
        }
    }

    #[tokio::test]
    async fn records_append_in_order() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("contacts_{}.json", Uuid::new_v4()));
        let log = ContactLog::new(&tmp).await?;

        log.record(msg("ann")).await?;
        log.record(msg("bob")).await?;
        // identical submissions are kept, not collapsed
        log.record(msg("bob")).await?;

        let all = log.list().await;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "ann");
        assert_eq!(all[1], all[2]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn invalid_message_not_recorded() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("contacts_{}.json", Uuid::new_v4()));
        let log = ContactLog::new(&tmp).await?;

        let mut bad = msg("ann");
        bad.email = "no-at-sign".into();
        assert!(matches!(log.record(bad).await, Err(ServiceError::Model(_))));
        assert!(log.list().await.is_empty());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
