//! Service layer for gift lists.
//! - `storage` holds the whole-document stores behind one trait.
//! - `lists` implements the list operations on top of a store.
//! - Errors are mapped to HTTP statuses by the server crate.

pub mod errors;
pub mod storage;
pub mod lists;

pub use lists::service::ListService;
