use std::sync::Arc;

use chrono::Utc;
use common::metrics::{
    CLAIM_CONFLICTS_TOTAL, ITEMS_CLAIMED_TOTAL, LISTS_CREATED_TOTAL, LISTS_UPDATED_TOTAL,
    STORE_WRITE_FAILURES_TOTAL,
};
use models::{ClaimInput, GiftList, ListMap, ListPatch, NewItemInput, NewListInput};
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

use super::new_id;
use crate::errors::ServiceError;
use crate::storage::ListStore;

/// Application service for gift lists.
///
/// Each mutation loads the whole document, changes one list, and writes the
/// whole document back. Mutations are serialized behind `write_lock` so two
/// requests in this process never overwrite each other; processes sharing a
/// backend are not coordinated beyond the optional `version` check.
pub struct ListService {
    store: Arc<dyn ListStore>,
    write_lock: Mutex<()>,
}

impl ListService {
    pub fn new(store: Arc<dyn ListStore>) -> Self {
        Self { store, write_lock: Mutex::new(()) }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewListInput) -> Result<GiftList, ServiceError> {
        let list = input.into_list(new_id(), Utc::now())?;

        let _guard = self.write_lock.lock().await;
        let mut lists = self.store.read_all().await;
        lists.insert(list.id.clone(), list.clone());
        self.persist(&lists).await?;

        LISTS_CREATED_TOTAL.inc();
        info!(list_id = %list.id, backend = self.backend(), "list_created");
        Ok(list)
    }

    pub async fn get(&self, id: &str) -> Result<GiftList, ServiceError> {
        self.store
            .read_all()
            .await
            .remove(id)
            .ok_or_else(|| ServiceError::not_found("list"))
    }

    /// Shallow merge of `patch` over the stored list. A `version` in the patch
    /// must match the stored one.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: ListPatch) -> Result<GiftList, ServiceError> {
        self.mutate(id, "update", move |list| {
            if let Some(expected) = patch.version {
                if expected != list.version {
                    return Err(ServiceError::Conflict(format!(
                        "list changed since version {expected} (now {})",
                        list.version
                    )));
                }
            }
            list.apply_patch(patch)?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, input))]
    pub async fn add_item(&self, id: &str, input: NewItemInput) -> Result<GiftList, ServiceError> {
        let item = input.into_item(new_id())?;
        self.mutate(id, "add_item", move |list| {
            list.items.push(item);
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn remove_item(&self, id: &str, item_id: &str) -> Result<GiftList, ServiceError> {
        self.mutate(id, "remove_item", |list| {
            list.remove_item(item_id)
                .map(|_| ())
                .ok_or_else(|| ServiceError::not_found("item"))
        })
        .await
    }

    /// Claim an unclaimed item. Claiming a taken item is a conflict, not an overwrite.
    #[instrument(skip(self, input))]
    pub async fn claim_item(&self, id: &str, item_id: &str, input: ClaimInput) -> Result<GiftList, ServiceError> {
        let claimer = input.claimer()?;
        let list = self
            .mutate(id, "claim_item", |list| {
                let item = list.item_mut(item_id).ok_or_else(|| ServiceError::not_found("item"))?;
                if item.is_claimed() {
                    CLAIM_CONFLICTS_TOTAL.inc();
                    return Err(ServiceError::Conflict("item is already claimed".into()));
                }
                item.claim(claimer, Utc::now());
                Ok(())
            })
            .await?;
        ITEMS_CLAIMED_TOTAL.inc();
        info!(list_id = %id, item_id = %item_id, claimed = list.claimed_count(), total = list.items.len(), "item_claimed");
        Ok(list)
    }

    /// Clear a claim. Unclaiming a free item is a no-op write.
    #[instrument(skip(self))]
    pub async fn unclaim_item(&self, id: &str, item_id: &str) -> Result<GiftList, ServiceError> {
        self.mutate(id, "unclaim_item", |list| {
            let item = list.item_mut(item_id).ok_or_else(|| ServiceError::not_found("item"))?;
            item.unclaim();
            Ok(())
        })
        .await
    }

    /// Read-modify-write of one list under the write lock; bumps `version`.
    async fn mutate<F>(&self, id: &str, op: &'static str, f: F) -> Result<GiftList, ServiceError>
    where
        F: FnOnce(&mut GiftList) -> Result<(), ServiceError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut lists = self.store.read_all().await;
        let list = lists.get_mut(id).ok_or_else(|| ServiceError::not_found("list"))?;
        f(list)?;
        list.version += 1;
        let updated = list.clone();
        self.persist(&lists).await?;

        LISTS_UPDATED_TOTAL.inc();
        info!(list_id = %id, op, version = updated.version, "list_mutated");
        Ok(updated)
    }

    async fn persist(&self, lists: &ListMap) -> Result<(), ServiceError> {
        if let Err(e) = self.store.write_all(lists).await {
            STORE_WRITE_FAILURES_TOTAL.inc();
            error!(backend = self.backend(), error = %e, "writing lists document failed");
            return Err(e);
        }
        Ok(())
    }
}
