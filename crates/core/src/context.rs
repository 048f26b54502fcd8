//! Per-conversion state: identity provider and patient reference.
//!
//! A [`ConversionContext`] is created for exactly one top-level conversion and threaded through
//! every rule as `&mut`. Nothing in it is process-global, so independent documents can convert
//! in parallel, each with its own context.

use crate::config::CoreConfig;
use cda2fhir_uuid::{IdStrategy, TokenGenerator};
use fhir::{Reference, ResourceId, ResourceKind};

#[derive(Clone, Debug)]
pub struct ConversionContext {
    tokens: TokenGenerator,
    patient: Option<Reference>,
}

impl ConversionContext {
    /// Context for a rule invoked outside any document.
    ///
    /// Tokens are random UUIDs and every patient-referencing field points at the placeholder
    /// `Patient/0`.
    pub fn standalone() -> Self {
        Self::standalone_with(&CoreConfig::default())
    }

    /// Standalone context using the configured placeholder token.
    ///
    /// The identity strategy is always random UUIDs: without a document there is no numbering
    /// scheme to follow.
    pub fn standalone_with(config: &CoreConfig) -> Self {
        let placeholder = ResourceId::new(
            ResourceKind::Patient,
            config.placeholder_patient_token().clone(),
        );
        Self {
            tokens: TokenGenerator::new(IdStrategy::Uuid),
            patient: Some(placeholder.reference()),
        }
    }

    /// Context for one document conversion.
    ///
    /// The patient reference is unset until the document's patient has been transformed.
    pub fn for_document(config: &CoreConfig) -> Self {
        Self {
            tokens: TokenGenerator::new(config.id_strategy()),
            patient: None,
        }
    }

    /// Allocates the identity of a new resource.
    pub fn next_id(&mut self, kind: ResourceKind) -> ResourceId {
        ResourceId::new(kind, self.tokens.next_token())
    }

    /// The reference every patient-referencing field uses.
    pub fn patient_reference(&self) -> Option<Reference> {
        self.patient.clone()
    }

    pub(crate) fn set_patient(&mut self, patient: &ResourceId) {
        self.patient = Some(patient.reference());
    }

    /// Number of identities allocated so far.
    pub fn issued(&self) -> u64 {
        self.tokens.issued()
    }
}
