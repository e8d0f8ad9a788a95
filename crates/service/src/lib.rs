//! Service layer: file-backed JSON stores and the business operations built
//! on them (car catalog, photo uploads, accounts, contact log).
//! - Collections are value types, fully rewritten on every mutation.
//! - Stores own the single-writer serialization point for their file.
//! - Clear error types per concern; storage failures always propagate.

pub mod auth;
pub mod catalog;
pub mod contact;
pub mod errors;
pub mod storage;
pub mod uploads;
