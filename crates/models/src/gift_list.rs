use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Display name recorded for claims made without a name.
pub const ANONYMOUS_CLAIMER: &str = "Anonymous";

/// The whole persisted document: every list keyed by its id.
pub type ListMap = HashMap<String, GiftList>;

/// A single wish inside a list.
///
/// `claimed_by` and `claimed_at` move together: both `None` while the item is
/// free, both `Some` once someone has claimed it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GiftItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free-form display text such as "$25" or "around 30 EUR".
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub claimed_by: Option<String>,
    #[serde(default)]
    pub claimed_at: Option<DateTime<Utc>>,
}

impl GiftItem {
    /// An empty `claimedBy` counts as free.
    pub fn is_claimed(&self) -> bool {
        self.claimed_by.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    pub fn claim(&mut self, claimer: String, at: DateTime<Utc>) {
        self.claimed_by = Some(claimer);
        self.claimed_at = Some(at);
    }

    pub fn unclaim(&mut self) {
        self.claimed_by = None;
        self.claimed_at = None;
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.id.trim().is_empty() {
            return Err(ModelError::missing("item.id"));
        }
        if self.name.trim().is_empty() {
            return Err(ModelError::missing("item.name"));
        }
        if self.is_claimed() != self.claimed_at.is_some() {
            return Err(ModelError::Validation(format!(
                "item {}: claimedBy and claimedAt must be set or cleared together",
                self.id
            )));
        }
        Ok(())
    }
}

/// A birthday wishlist.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GiftList {
    pub id: String,
    pub name: String,
    pub creator: String,
    /// `YYYY-MM-DD` for lists written here. Older documents may hold free text,
    /// which is kept as-is so the list still loads.
    pub birthday: String,
    #[serde(default)]
    pub items: Vec<GiftItem>,
    pub created_at: DateTime<Utc>,
    /// Bumped on every successful write; documents written before it existed read as 0.
    #[serde(default)]
    pub version: u64,
}

impl GiftList {
    pub fn item(&self, item_id: &str) -> Option<&GiftItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut GiftItem> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    /// Remove an item by id, keeping the order of the others.
    pub fn remove_item(&mut self, item_id: &str) -> Option<GiftItem> {
        let pos = self.items.iter().position(|i| i.id == item_id)?;
        Some(self.items.remove(pos))
    }

    pub fn claimed_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_claimed()).count()
    }

    /// Shallow merge: every field present in the patch replaces the stored one.
    /// A supplied `items` array replaces the whole array.
    pub fn apply_patch(&mut self, patch: ListPatch) -> Result<(), ModelError> {
        if let Some(name) = &patch.name {
            non_blank("name", name)?;
        }
        if let Some(creator) = &patch.creator {
            non_blank("creator", creator)?;
        }
        let birthday = patch.birthday.as_deref().map(parse_birthday).transpose()?;
        if let Some(items) = &patch.items {
            validate_items(items)?;
        }

        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(creator) = patch.creator {
            self.creator = creator.trim().to_string();
        }
        if let Some(birthday) = birthday {
            self.birthday = birthday.to_string();
        }
        if let Some(items) = patch.items {
            self.items = items;
        }
        Ok(())
    }
}

/// Every item must be individually valid and ids must be unique within the list.
pub fn validate_items(items: &[GiftItem]) -> Result<(), ModelError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        item.validate()?;
        if !seen.insert(item.id.as_str()) {
            return Err(ModelError::Validation(format!("duplicate item id: {}", item.id)));
        }
    }
    Ok(())
}

/// Body of a create request. Fields are optional so a missing one surfaces as
/// a validation error rather than a deserialization failure.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
}

impl NewListInput {
    /// Validate and build a fresh list with no items.
    pub fn into_list(self, id: String, now: DateTime<Utc>) -> Result<GiftList, ModelError> {
        let name = required("name", self.name)?;
        let creator = required("creator", self.creator)?;
        let birthday = required("birthday", self.birthday)?;
        let birthday = parse_birthday(&birthday)?.to_string();
        Ok(GiftList { id, name, creator, birthday, items: Vec::new(), created_at: now, version: 0 })
    }
}

/// Body of an update request. Absent fields leave the stored value untouched;
/// `id` and `createdAt` are not patchable and are dropped on deserialization.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<GiftItem>>,
    /// When present, the update only applies if it matches the stored version.
    #[serde(default)]
    pub version: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItemInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl NewItemInput {
    pub fn into_item(self, id: String) -> Result<GiftItem, ModelError> {
        let name = required("name", self.name)?;
        let trimmed = |v: Option<String>| v.map(|s| s.trim().to_string()).unwrap_or_default();
        Ok(GiftItem {
            id,
            name,
            description: trimmed(self.description),
            price: trimmed(self.price),
            link: trimmed(self.link),
            claimed_by: None,
            claimed_at: None,
        })
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimInput {
    #[serde(default)]
    pub claimed_by: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
}

impl ClaimInput {
    /// Name to record on the item.
    pub fn claimer(&self) -> Result<String, ModelError> {
        if self.anonymous {
            return Ok(ANONYMOUS_CLAIMER.to_string());
        }
        required("claimedBy", self.claimed_by.clone())
    }
}

pub fn parse_birthday(raw: &str) -> Result<NaiveDate, ModelError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ModelError::Validation(format!("birthday must be a YYYY-MM-DD date, got {raw:?}")))
}

fn required(field: &str, value: Option<String>) -> Result<String, ModelError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ModelError::missing(field)),
    }
}

fn non_blank(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_list() -> GiftList {
        NewListInput {
            name: Some("B-day".into()),
            creator: Some("Sam".into()),
            birthday: Some("2025-05-01".into()),
        }
        .into_list("abc".into(), Utc::now())
        .unwrap()
    }

    fn sample_list_with_created_at(created_at: DateTime<Utc>) -> GiftList {
        GiftList { created_at, ..sample_list() }
    }

    fn item(id: &str, name: &str) -> GiftItem {
        NewItemInput { name: Some(name.into()), ..Default::default() }.into_item(id.into()).unwrap()
    }

    #[test]
    fn new_list_starts_empty() {
        let list = sample_list();
        assert_eq!(list.id, "abc");
        assert_eq!(list.birthday, "2025-05-01");
        assert!(list.items.is_empty());
        assert_eq!(list.version, 0);
    }

    #[test]
    fn new_list_requires_every_field() {
        let err = NewListInput { name: Some("B-day".into()), creator: None, birthday: Some("2025-05-01".into()) }
            .into_list("x".into(), Utc::now())
            .unwrap_err();
        assert_eq!(err, ModelError::missing("creator"));

        let err = NewListInput { name: Some("  ".into()), creator: Some("Sam".into()), birthday: Some("2025-05-01".into()) }
            .into_list("x".into(), Utc::now())
            .unwrap_err();
        assert_eq!(err, ModelError::missing("name"));

        let err = NewListInput { name: Some("B-day".into()), creator: Some("Sam".into()), birthday: Some("May 1st".into()) }
            .into_list("x".into(), Utc::now());
        assert!(matches!(err, Err(ModelError::Validation(_))));
    }

    #[test]
    fn list_serializes_camel_case() {
        let mut list = sample_list();
        list.items.push(item("i1", "Book"));
        let v = serde_json::to_value(&list).unwrap();
        assert_eq!(v["birthday"], "2025-05-01");
        assert!(v["createdAt"].is_string());
        assert_eq!(v["items"][0]["claimedBy"], serde_json::Value::Null);
        assert_eq!(v["items"][0]["claimedAt"], serde_json::Value::Null);
    }

    #[test]
    fn item_fields_default_when_absent() {
        let it: GiftItem = serde_json::from_value(json!({"id": "i1", "name": "Lego"})).unwrap();
        assert_eq!(it.description, "");
        assert_eq!(it.price, "");
        assert!(!it.is_claimed());
    }

    #[test]
    fn patch_replaces_items_and_ignores_identity() {
        let mut list = sample_list();
        list.items.push(item("old", "Old thing"));
        let created_at = list.created_at;

        let patch: ListPatch = serde_json::from_value(json!({
            "id": "hijack",
            "createdAt": "2000-01-01T00:00:00Z",
            "name": "Party",
            "items": [{"id": "new", "name": "Kite", "claimedBy": null, "claimedAt": null}]
        }))
        .unwrap();
        list.apply_patch(patch).unwrap();

        assert_eq!(list.id, "abc");
        assert_eq!(list.created_at, created_at);
        assert_eq!(list.name, "Party");
        assert_eq!(list.creator, "Sam");
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].id, "new");
    }

    #[test]
    fn patch_rejects_half_claimed_item() {
        let mut list = sample_list();
        let patch: ListPatch = serde_json::from_value(json!({
            "items": [{"id": "i1", "name": "Kite", "claimedBy": "Alice", "claimedAt": null}]
        }))
        .unwrap();
        assert!(list.apply_patch(patch).is_err());
        assert!(list.items.is_empty());
    }

    #[test]
    fn patch_validates_name_creator_and_birthday() {
        let mut list = sample_list();
        for body in [json!({"name": "  "}), json!({"creator": ""}), json!({"birthday": "June 3"})] {
            let patch: ListPatch = serde_json::from_value(body).unwrap();
            assert!(matches!(list.apply_patch(patch), Err(ModelError::Validation(_))));
        }
        assert_eq!(list, sample_list_with_created_at(list.created_at));

        let patch = ListPatch { birthday: Some(" 2025-06-03 ".into()), ..Default::default() };
        list.apply_patch(patch).unwrap();
        assert_eq!(list.birthday, "2025-06-03");
    }

    #[test]
    fn stored_free_text_birthday_still_loads() {
        let list: GiftList = serde_json::from_value(json!({
            "id": "old",
            "name": "Party",
            "creator": "Sam",
            "birthday": "June 3",
            "items": [],
            "createdAt": "2024-06-01T10:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(list.birthday, "June 3");
        assert_eq!(list.version, 0);
    }

    #[test]
    fn patch_rejects_duplicate_item_ids() {
        let mut list = sample_list();
        let patch = ListPatch { items: Some(vec![item("same", "A"), item("same", "B")]), ..Default::default() };
        assert!(matches!(list.apply_patch(patch), Err(ModelError::Validation(_))));
    }

    #[test]
    fn claim_and_unclaim_move_together() {
        let mut it = item("i1", "Book");
        it.claim("Alice".into(), Utc::now());
        assert!(it.is_claimed());
        assert!(it.claimed_at.is_some());
        assert!(it.validate().is_ok());
        it.unclaim();
        assert_eq!(it.claimed_by, None);
        assert_eq!(it.claimed_at, None);
    }

    #[test]
    fn empty_claimer_is_not_a_claim() {
        let it: GiftItem =
            serde_json::from_value(json!({"id": "i1", "name": "Lego", "claimedBy": "", "claimedAt": null})).unwrap();
        assert!(!it.is_claimed());
        assert!(it.validate().is_ok());

        let mut list = sample_list();
        list.items = vec![it, item("i2", "Kite")];
        list.items[1].claim("Alice".into(), Utc::now());
        assert_eq!(list.claimed_count(), 1);
    }

    #[test]
    fn anonymous_claim_needs_no_name() {
        let c = ClaimInput { claimed_by: None, anonymous: true };
        assert_eq!(c.claimer().unwrap(), ANONYMOUS_CLAIMER);
        let c = ClaimInput { claimed_by: Some(" ".into()), anonymous: false };
        assert!(c.claimer().is_err());
        let c = ClaimInput { claimed_by: Some(" Alice ".into()), anonymous: false };
        assert_eq!(c.claimer().unwrap(), "Alice");
    }

    #[test]
    fn remove_item_keeps_order() {
        let mut list = sample_list();
        list.items = vec![item("a", "A"), item("b", "B"), item("c", "C")];
        assert!(list.remove_item("b").is_some());
        assert!(list.remove_item("zzz").is_none());
        let ids: Vec<_> = list.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
