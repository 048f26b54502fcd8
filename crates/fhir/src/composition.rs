//! The document-level resource.

use serde::Serialize;

use crate::codes::{AttestationMode, CompositionStatus};
use crate::datatypes::{CodeableConcept, DateTime, Identifier, Narrative};
use crate::ids::Reference;

fhir_resource! {
    pub struct Composition {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub identifier: Option<Identifier>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub date: Option<DateTime>,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        pub type_code: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<CompositionStatus>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub confidentiality: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub subject: Option<Reference>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub author: Vec<Reference>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub attester: Vec<CompositionAttester>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub custodian: Option<Reference>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub section: Vec<CompositionSection>,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionAttester {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mode: Vec<AttestationMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<Reference>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Narrative>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<Reference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub section: Vec<CompositionSection>,
}
