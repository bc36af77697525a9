//! Storage module
//!
//! Object storage for uploaded photos, voice notes and media.

pub mod object_store;

pub use object_store::ObjectStore;
