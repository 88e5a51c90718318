//! Gallery upload worker
//!
//! HTTP ingress for storage event notifications. Each `POST /events/storage`
//! carries an S3-style `{"Records": [...]}` batch that is handed to the upload
//! pipeline record by record.

pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
