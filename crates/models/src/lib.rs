//! Data model for gift lists and their items.
//! - Serde shapes match the persisted document and the HTTP bodies (camelCase).
//! - Validation lives next to the types so every caller shares it.

pub mod errors;
pub mod gift_list;

pub use gift_list::{ClaimInput, GiftItem, GiftList, ListMap, ListPatch, NewItemInput, NewListInput};
