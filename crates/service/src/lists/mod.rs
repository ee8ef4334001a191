//! Gift list operations over a [`ListStore`](crate::storage::ListStore).

pub mod service;

/// Fresh identifier for lists and items: UUID v4 in simple (hex) form.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
