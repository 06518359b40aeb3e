pub mod base;
pub mod file_store;
pub mod memory_store;

pub use base::{create_store, CredentialStore, TokenPair};
