use std::{path::PathBuf, sync::Arc};

use tracing::info;
use uuid::Uuid;

use models::car::{CarListing, NewCar};

use crate::errors::ServiceError;
use crate::storage::json_list_store::JsonListStore;
use crate::uploads::UploadStore;

/// Business operations over the persisted car collection.
///
/// Listings reference photos by the storage filenames the [`UploadStore`]
/// hands out; deletion removes those files before dropping the record.
#[derive(Clone)]
pub struct CarCatalog {
    store: Arc<JsonListStore<CarListing>>,
    uploads: UploadStore,
}

impl CarCatalog {
    /// Initialize over the collection file at `path`. Creates the file
    /// empty if missing.
    pub async fn new<P: Into<PathBuf>>(path: P, uploads: UploadStore) -> Result<Arc<Self>, ServiceError> {
        let store = JsonListStore::<CarListing>::new(path).await?;
        Ok(Arc::new(Self { store, uploads }))
    }

    /// Create a listing referencing already-stored photos. Ids are random
    /// tokens, never positional counters.
    pub async fn create(&self, input: NewCar, photos: Vec<String>) -> Result<CarListing, ServiceError> {
        input.validate()?;
        let car = CarListing {
            id: Uuid::new_v4(),
            make: input.make,
            model: input.model,
            year: input.year,
            price: input.price,
            details: input.details,
            photos,
        };
        self.store.push(car.clone()).await?;
        info!(car_id = %car.id, make = %car.make, model = %car.model, "listing created");
        Ok(car)
    }

    /// The persisted collection verbatim, in insertion order.
    pub async fn list(&self) -> Vec<CarListing> {
        self.store.list().await
    }

    /// Delete a listing and its stored photos. An unknown id is a silent
    /// no-op; returns whether a listing was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let Some(car) = self.store.list().await.into_iter().find(|c| c.id == id) else {
            return Ok(false);
        };

        // photo files go before the record
        for photo in &car.photos {
            self.uploads.remove(photo).await?;
        }
        self.store
            .update(|cars| {
                cars.retain(|c| c.id != id);
                Ok(())
            })
            .await?;
        info!(car_id = %id, photos = car.photos.len(), "listing deleted");
        Ok(true)
    }
}
