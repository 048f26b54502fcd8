//! C-CDA source model.
//!
//! This crate defines the **wire model** of an HL7 CDA R2 / C-CDA clinical document as it is
//! handed to the converter, serialised as YAML or JSON:
//! - [`datatypes`]: HL7 v3 data types (`II`, `CD`, `PQ`, `IVL_TS`, `PN`, `AD`, `TEL`, ...)
//! - [`entities`]: roles, entities and participations (authors, performers, patient role)
//! - [`statements`]: clinical statements tagged by their C-CDA template
//! - [`document`]: the document header and its sections
//!
//! Every element may carry a `nullFlavor`. A null-flavored element is absent: consumers must not
//! interpret any of its other fields. [`NullFlavored`], [`present`] and [`present_items`] make
//! that check uniform.
//!
//! The model is read-only. The converter never mutates a source tree.

pub mod datatypes;
pub mod document;
pub mod entities;
pub mod statements;

pub use datatypes::{
    present, present_items, Ad, AnyValue, Bl, Cd, Ed, Ii, IvlPq, IvlTs, NullFlavor, NullFlavored,
    On, PivlTs, Pn, Pq, Rto, St, StrucDocText, SxcmTs, Tel, Ts,
};
pub use document::{ClinicalDocument, Section};
pub use statements::ClinicalStatement;

/// Errors returned by the `cda` source crate.
#[derive(Debug, thiserror::Error)]
pub enum CdaError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`CdaError`].
pub type CdaResult<T> = Result<T, CdaError>;

/// Read a clinical document from YAML.
pub fn read_document_yaml(yaml: &str) -> CdaResult<ClinicalDocument> {
    if yaml.trim().is_empty() {
        return Err(CdaError::InvalidInput("document is empty".into()));
    }
    document::read_yaml(yaml)
}

/// Read a clinical document from JSON.
pub fn read_document_json(json: &str) -> CdaResult<ClinicalDocument> {
    if json.trim().is_empty() {
        return Err(CdaError::InvalidInput("document is empty".into()));
    }
    document::read_json(json)
}
