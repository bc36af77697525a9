//! D(ane)ua library
//!
//! Client core for a two-person shared space: the typed gateway onto the
//! backend, live change feeds, optimistic local state, the session and one
//! controller per feature. `LocalBackend` stands in for the hosted service.

pub mod app;
pub mod backend;
pub mod capabilities;
pub mod config;
pub mod crypto;
pub mod database;
pub mod error;
pub mod models;
pub mod notify;
pub mod services;
pub mod session;
pub mod storage;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;
