//! Versioned layout document export/import.
//!
//! # Responsibility
//! - Snapshot the whole `GridModel` into a self-describing document.
//! - Validate incoming documents and hand them to `GridModel::replace_all`.
//!
//! # Invariants
//! - Export is read-only.
//! - Import is all-or-nothing: any structural or geometric failure leaves
//!   the model unchanged.
//! - Malformed text is `Parse`; missing or ill-typed fields and unsupported
//!   versions are `SchemaValidation`.

use crate::grid::error::{LayoutError, LayoutResult};
use crate::grid::grid_model::GridModel;
use crate::model::layout::{FacilityLayout, GridSize, Infrastructure};
use crate::model::unit::Unit;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document version written by this build and the newest one it reads.
pub const LAYOUT_DOCUMENT_VERSION: u32 = 1;

/// Serialized form of a full facility layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    pub version: u32,
    pub grid_size: GridSize,
    pub units: Vec<Unit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub infrastructure: Vec<Infrastructure>,
}

impl LayoutDocument {
    pub fn into_layout(self) -> FacilityLayout {
        FacilityLayout {
            grid_size: self.grid_size,
            units: self.units,
            infrastructure: self.infrastructure,
        }
    }
}

/// Snapshots the model. Never mutates.
pub fn export_layout(model: &GridModel) -> LayoutDocument {
    let layout = model.to_layout();
    info!(
        "event=layout_export module=serialization status=ok version={} units={}",
        LAYOUT_DOCUMENT_VERSION,
        layout.units.len()
    );
    LayoutDocument {
        version: LAYOUT_DOCUMENT_VERSION,
        grid_size: layout.grid_size,
        units: layout.units,
        infrastructure: layout.infrastructure,
    }
}

/// Replaces the model with the document contents.
pub fn import_layout(model: &mut GridModel, document: LayoutDocument) -> LayoutResult<()> {
    let result = check_version(document.version)
        .and_then(|()| model.replace_all(document.into_layout()));
    match &result {
        Ok(()) => info!(
            "event=layout_import module=serialization status=ok units={}",
            model.len()
        ),
        Err(err) => warn!(
            "event=layout_import module=serialization status=rejected error_code={} error={}",
            err.code(),
            err
        ),
    }
    result
}

/// Pretty-printed JSON text of a document.
pub fn to_json_string(document: &LayoutDocument) -> LayoutResult<String> {
    serde_json::to_string_pretty(document).map_err(|err| LayoutError::Parse(err.to_string()))
}

/// Parses document text without touching any model.
pub fn from_json_str(text: &str) -> LayoutResult<LayoutDocument> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| LayoutError::Parse(err.to_string()))?;
    if !value.is_object() {
        return Err(LayoutError::SchemaValidation(
            "layout document must be a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|err| LayoutError::SchemaValidation(err.to_string()))
}

pub fn export_layout_json(model: &GridModel) -> LayoutResult<String> {
    to_json_string(&export_layout(model))
}

/// Parses and imports document text in one step.
pub fn import_layout_json(model: &mut GridModel, text: &str) -> LayoutResult<()> {
    match from_json_str(text) {
        Ok(document) => import_layout(model, document),
        Err(err) => {
            warn!(
                "event=layout_import module=serialization status=rejected error_code={} error={}",
                err.code(),
                err
            );
            Err(err)
        }
    }
}

fn check_version(version: u32) -> LayoutResult<()> {
    if version == 0 || version > LAYOUT_DOCUMENT_VERSION {
        return Err(LayoutError::SchemaValidation(format!(
            "unsupported layout document version {version}; expected 1..={LAYOUT_DOCUMENT_VERSION}"
        )));
    }
    Ok(())
}
