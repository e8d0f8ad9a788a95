//! Domain records and validation helpers shared across the workspace.
//! Records mirror the on-disk JSON shapes: `cars.json` is an array of
//! [`car::CarListing`], `users.json` maps usernames to
//! [`account::StoredCredential`], `contacts.json` is an array of
//! [`contact::ContactMessage`].

pub mod account;
pub mod car;
pub mod contact;
pub mod errors;
