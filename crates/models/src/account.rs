use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Hashed credential record stored per username.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredCredential {
    pub password_hash: String,
}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    let len = username.chars().count();
    if !(2..=20).contains(&len) {
        return Err(ModelError::Validation("username must be 2..=20 characters".into()));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        return Err(ModelError::Validation("username contains invalid characters".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ModelError> {
    if password.len() < 8 {
        return Err(ModelError::Validation("password too short (>=8)".into()));
    }
    Ok(())
}
