use std::fmt;

use serde::{Deserialize, Deserializer};

/// Stable key of one row, used to match confirmations against the pending click.
///
/// Numeric ids found in response payloads are normalized to their decimal
/// string form so `5` and `"5"` identify the same row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
            Uint(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Int(n) => Self(n.to_string()),
            RawId::Uint(n) => Self(n.to_string()),
        })
    }
}

/// One automatable row as currently observed in the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// `None` when the row's identity could not be parsed.
    pub id: Option<ItemId>,
    /// Visible and not filtered out.
    pub eligible: bool,
    /// Clickable, i.e. the save control is not disabled.
    pub actionable: bool,
}

impl WorkItem {
    /// An eligible, clickable row.
    pub fn ready(id: impl Into<ItemId>) -> Self {
        Self {
            id: Some(id.into()),
            eligible: true,
            actionable: true,
        }
    }

    /// An eligible row whose save control is disabled.
    pub fn disabled(id: impl Into<ItemId>) -> Self {
        Self {
            id: Some(id.into()),
            eligible: true,
            actionable: false,
        }
    }

    /// A row that is hidden or filtered out.
    pub fn hidden(id: impl Into<ItemId>) -> Self {
        Self {
            id: Some(id.into()),
            eligible: false,
            actionable: true,
        }
    }

    /// An eligible row whose identity could not be parsed.
    pub fn malformed() -> Self {
        Self {
            id: None,
            eligible: true,
            actionable: true,
        }
    }

    /// The row's id, if it is eligible and identifiable.
    pub fn eligible_id(&self) -> Option<&ItemId> {
        if self.eligible {
            self.id.as_ref()
        } else {
            None
        }
    }
}

/// Number of rows a run would process if started now.
pub(crate) fn count_eligible(items: &[WorkItem]) -> usize {
    items.iter().filter(|item| item.eligible_id().is_some()).count()
}
