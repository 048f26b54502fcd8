//! C-CDA document header and structured body.

use crate::datatypes::{Cd, Ii, NullFlavor, St, StrucDocText, Ts};
use crate::entities::{Author, Authenticator, Custodian, RecordTarget};
use crate::statements::ClinicalStatement;
use crate::{CdaError, CdaResult};
use serde::Deserialize;

/// A document section with its narrative block and coded entries.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Section {
    pub ids: Vec<Ii>,
    pub code: Option<Cd>,
    pub title: Option<St>,
    pub text: Option<StrucDocText>,
    pub entries: Vec<ClinicalStatement>,
    /// Nested `component/section` elements.
    pub sections: Vec<Section>,
    pub null_flavor: Option<NullFlavor>,
}

/// Root of a C-CDA document.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClinicalDocument {
    pub id: Option<Ii>,
    pub code: Option<Cd>,
    pub title: Option<St>,
    pub effective_time: Option<Ts>,
    pub confidentiality_code: Option<Cd>,
    pub language_code: Option<Cd>,
    pub record_targets: Vec<RecordTarget>,
    pub authors: Vec<Author>,
    pub legal_authenticator: Option<Authenticator>,
    pub authenticators: Vec<Authenticator>,
    pub custodian: Option<Custodian>,
    pub sections: Vec<Section>,
    pub null_flavor: Option<NullFlavor>,
}

crate::impl_null_flavored!(Section, ClinicalDocument);

/// Strictly parse a [`ClinicalDocument`] from YAML text.
///
/// This uses `serde_path_to_error` to surface the path (e.g. `sections[0].entries[2].values`)
/// of the failing field when the YAML does not match the document model.
///
/// # Errors
///
/// Returns [`CdaError::Translation`] if the YAML does not represent a clinical document.
pub fn read_yaml(yaml_text: &str) -> CdaResult<ClinicalDocument> {
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
    serde_path_to_error::deserialize(deserializer).map_err(schema_mismatch)
}

/// Strictly parse a [`ClinicalDocument`] from JSON text.
///
/// # Errors
///
/// Returns [`CdaError::Translation`] if the JSON does not represent a clinical document.
pub fn read_json(json_text: &str) -> CdaResult<ClinicalDocument> {
    let mut deserializer = serde_json::Deserializer::from_str(json_text);
    let document = serde_path_to_error::deserialize(&mut deserializer).map_err(schema_mismatch)?;
    deserializer
        .end()
        .map_err(|e| CdaError::Translation(format!("trailing characters after document: {e}")))?;
    Ok(document)
}

fn schema_mismatch<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> CdaError {
    let path = err.path().to_string();
    let source = err.into_inner();
    let path = if path.is_empty() || path == "." {
        "<root>"
    } else {
        path.as_str()
    };
    CdaError::Translation(format!("ClinicalDocument schema mismatch at {path}: {source}"))
}
