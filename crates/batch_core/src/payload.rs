use serde::Deserialize;
use serde_json::Value;

use crate::ItemId;

/// Save-completion notification, classified by the response shape it arrived in.
///
/// The host broadcasts every mutation response on one channel, so a
/// notification may concern the pending row, several rows, or unrelated work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// `data.sceneUpdate.id`
    Single(ItemId),
    /// `data.scenesUpdate`, either a list of updated rows or a single object.
    Batch(Vec<ItemId>),
    /// `data.bulkSceneUpdate.id`
    Alternate(ItemId),
    /// No recognized shape.
    Unrecognized,
}

impl Confirmation {
    /// Classify a broadcast event detail of the form `{ "data": { ... } }`.
    pub fn from_event(detail: &Value) -> Self {
        match detail.get("data") {
            Some(data) => Self::from_data(data),
            None => Self::Unrecognized,
        }
    }

    /// Classify the `data` object of a response.
    ///
    /// Shapes are tried in priority order; the first one present wins even if
    /// it carries no usable id.
    pub fn from_data(data: &Value) -> Self {
        if let Some(id) = present(data, "sceneUpdate").and_then(entity_id) {
            return Self::Single(id);
        }
        if let Some(updated) = present(data, "scenesUpdate") {
            let ids = match updated {
                Value::Array(entries) => entries.iter().filter_map(entity_id).collect(),
                single => entity_id(single).into_iter().collect(),
            };
            return Self::Batch(ids);
        }
        if let Some(id) = present(data, "bulkSceneUpdate").and_then(entity_id) {
            return Self::Alternate(id);
        }
        Self::Unrecognized
    }

    /// The id this notification confirms for `pending`, if any.
    pub fn matched_id(&self, pending: &ItemId) -> Option<&ItemId> {
        match self {
            Self::Single(id) | Self::Alternate(id) => Some(id).filter(|id| *id == pending),
            Self::Batch(ids) => ids.iter().find(|id| *id == pending),
            Self::Unrecognized => None,
        }
    }
}

fn present<'a>(data: &'a Value, field: &str) -> Option<&'a Value> {
    data.get(field).filter(|value| !value.is_null())
}

fn entity_id(entity: &Value) -> Option<ItemId> {
    let raw = entity.get("id")?;
    ItemId::deserialize(raw)
        .ok()
        .filter(|id| !id.as_str().is_empty())
}
