use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

/// A published car listing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CarListing {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: String,
    pub details: String,
    /// Bare storage filenames inside the managed upload directory.
    pub photos: Vec<String>,
}

/// Listing fields as submitted by the uploader, before an id is assigned.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NewCar {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: String,
    pub details: String,
}

impl NewCar {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.make.trim().is_empty() {
            return Err(ModelError::Validation("make required".into()));
        }
        if self.model.trim().is_empty() {
            return Err(ModelError::Validation("model required".into()));
        }
        if !(1886..=2100).contains(&self.year) {
            return Err(ModelError::Validation("year out of range".into()));
        }
        if self.price.trim().is_empty() {
            return Err(ModelError::Validation("price required".into()));
        }
        if self.details.trim().is_empty() {
            return Err(ModelError::Validation("details required".into()));
        }
        Ok(())
    }
}
