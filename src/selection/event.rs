use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Opaque key of a tabular dataset shared across views.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(pub String);

/// Identity of a chart view or map layer that publishes selections.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(DatasetId);
string_id!(ViewId);

/// Source id used by the store itself, e.g. when a resize clears a selection.
pub const STORE_VIEW_ID: &str = "store";

// ---------------------------------------------------------------------------
// Selection event
// ---------------------------------------------------------------------------

/// The unit of propagation: which view selected which rows of which dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionEvent {
    pub source_view_id: ViewId,
    pub dataset_id: DatasetId,
    pub selected_indices: Vec<usize>,
}

impl SelectionEvent {
    pub fn new(
        source_view_id: impl Into<String>,
        dataset_id: impl Into<String>,
        selected_indices: Vec<usize>,
    ) -> Self {
        Self {
            source_view_id: ViewId(source_view_id.into()),
            dataset_id: DatasetId(dataset_id.into()),
            selected_indices,
        }
    }

    /// Reject events whose ids are blank.
    pub fn validate(&self) -> Result<(), SelectionError> {
        if self.source_view_id.is_blank() {
            return Err(SelectionError::MissingSourceViewId);
        }
        if self.dataset_id.is_blank() {
            return Err(SelectionError::MissingDatasetId);
        }
        Ok(())
    }

    /// Wrap the event in the envelope the host state layer exchanges.
    pub fn to_host_action(&self) -> HostAction {
        HostAction::SetSelection(RawSelectionEvent {
            source_view_id: Some(self.source_view_id.0.clone()),
            dataset_id: Some(self.dataset_id.0.clone()),
            selected_indices: Some(self.selected_indices.clone()),
        })
    }
}

/// Selection payload as received from the host: every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSelectionEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_view_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_indices: Option<Vec<usize>>,
}

impl TryFrom<RawSelectionEvent> for SelectionEvent {
    type Error = SelectionError;

    fn try_from(raw: RawSelectionEvent) -> Result<Self, Self::Error> {
        let event = SelectionEvent {
            source_view_id: ViewId(raw.source_view_id.ok_or(SelectionError::MissingSourceViewId)?),
            dataset_id: DatasetId(raw.dataset_id.ok_or(SelectionError::MissingDatasetId)?),
            selected_indices: raw
                .selected_indices
                .ok_or(SelectionError::MissingSelectedIndices)?,
        };
        event.validate()?;
        Ok(event)
    }
}

/// `{type, payload}` envelope exchanged with the host store layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum HostAction {
    #[serde(rename = "SET_SELECTION")]
    SetSelection(RawSelectionEvent),
}

impl HostAction {
    /// Decode a host message; unknown action types and bad JSON are errors.
    pub fn from_json(text: &str) -> Result<Self, SelectionError> {
        serde_json::from_str(text).map_err(|e| SelectionError::Decode(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, SelectionError> {
        serde_json::to_string(self).map_err(|e| SelectionError::Decode(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons an event is dropped at the bus boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("selection event is missing sourceViewId")]
    MissingSourceViewId,
    #[error("selection event is missing datasetId")]
    MissingDatasetId,
    #[error("selection event is missing selectedIndices")]
    MissingSelectedIndices,
    #[error("row index {index} is out of range for dataset '{dataset}' with {num_rows} rows")]
    IndexOutOfRange {
        dataset: DatasetId,
        index: usize,
        num_rows: usize,
    },
    #[error("cannot decode host action: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_action_shape() {
        let event = SelectionEvent::new("A", "d1", vec![1, 2]);
        let json = event.to_host_action().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "SET_SELECTION");
        assert_eq!(value["payload"]["sourceViewId"], "A");
        assert_eq!(value["payload"]["datasetId"], "d1");
        assert_eq!(value["payload"]["selectedIndices"], serde_json::json!([1, 2]));
    }

    #[test]
    fn missing_fields_are_rejected() {
        let raw = RawSelectionEvent {
            source_view_id: Some("A".into()),
            dataset_id: None,
            selected_indices: Some(vec![]),
        };
        assert_eq!(
            SelectionEvent::try_from(raw),
            Err(SelectionError::MissingDatasetId)
        );

        let blank = SelectionEvent::new("  ", "d1", vec![]);
        assert_eq!(blank.validate(), Err(SelectionError::MissingSourceViewId));
    }

    #[test]
    fn unknown_action_type_fails_to_decode() {
        let err = HostAction::from_json(r#"{"type":"ZOOM","payload":{}}"#).unwrap_err();
        assert!(matches!(err, SelectionError::Decode(_)));
    }
}
