use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// A contact-form submission. Append-only, no identity.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::Validation("name required".into()));
        }
        if !self.email.contains('@') {
            return Err(ModelError::Validation("invalid email".into()));
        }
        if self.message.trim().is_empty() {
            return Err(ModelError::Validation("message required".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_must_contain_at() {
        let msg = ContactMessage {
            name: "Ann".into(),
            email: "not-an-email".into(),
            message: "hi".into(),
        };
        assert!(msg.validate().is_err());
    }

    #[test]
    fn complete_message_passes() {
        let msg = ContactMessage {
            name: "Ann".into(),
            email: "ann@example.com".into(),
            message: "Is the Corolla still available?".into(),
        };
        assert!(msg.validate().is_ok());
    }
}
