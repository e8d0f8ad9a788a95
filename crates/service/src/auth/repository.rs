use async_trait::async_trait;

use models::account::StoredCredential;

use super::errors::AuthError;

/// Repository abstraction for account persistence.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find(&self, username: &str) -> Result<Option<StoredCredential>, AuthError>;
    async fn exists(&self, username: &str) -> Result<bool, AuthError>;

    /// Store credentials for a new username; fails with
    /// [`AuthError::Conflict`] if the username is already taken.
    async fn create(&self, username: &str, credential: StoredCredential) -> Result<(), AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAccountRepository {
        accounts: Mutex<HashMap<String, StoredCredential>>,
    }

    #[async_trait]
    impl AccountRepository for MockAccountRepository {
        async fn find(&self, username: &str) -> Result<Option<StoredCredential>, AuthError> {
            let accounts = self.accounts.lock().unwrap();
            Ok(accounts.get(username).cloned())
        }

        async fn exists(&self, username: &str) -> Result<bool, AuthError> {
            let accounts = self.accounts.lock().unwrap();
            Ok(accounts.contains_key(username))
        }

        async fn create(&self, username: &str, credential: StoredCredential) -> Result<(), AuthError> {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(username) {
                return Err(AuthError::Conflict);
            }
            accounts.insert(username.to_string(), credential);
            Ok(())
        }
    }
}
