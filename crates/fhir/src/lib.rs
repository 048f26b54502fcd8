//! FHIR DSTU2 target model.
//!
//! This crate provides the **wire models** of the resources produced by the CDA converter:
//! - [`ids`]: resource identity (`Kind/token`) and literal references
//! - [`datatypes`]: general-purpose data types (`CodeableConcept`, `Period`, `HumanName`, ...)
//! - [`codes`]: code enumerations (statuses, categories, gender, ...)
//! - resource structs for the 19 resource kinds, collected in [`Resource`]
//! - [`bundle`]: the rendered `collection` bundle
//!
//! The model is write-only: resources are serialised (JSON or YAML), never parsed back.

#[macro_use]
mod macros;

pub mod administrative;
pub mod bundle;
pub mod clinical;
pub mod codes;
pub mod composition;
pub mod datatypes;
pub mod ids;
pub mod medication;
pub mod resource;

pub use administrative::{
    Device, Group, Location, Organization, Patient, PatientCommunication, PatientContact,
    Practitioner, PractitionerRole, Substance,
};
pub use bundle::{Bundle, BundleEntry};
pub use clinical::{
    AllergyIntolerance, AllergyIntoleranceReaction, Condition, DiagnosticReport, Encounter,
    EncounterLocation, EncounterParticipant, FamilyMemberHistory, FamilyMemberHistoryCondition,
    Immunization, ImmunizationExplanation, Observation, ObservationReferenceRange,
    ObservationValue, Procedure, ProcedurePerformer,
};
pub use composition::{Composition, CompositionAttester, CompositionSection};
pub use ids::{Reference, ResourceId, ResourceKind};
pub use medication::{
    DispenseDosageInstruction, Medication, MedicationIngredient, MedicationProduct,
    MedicationDispense, MedicationStatement, MedicationStatementDosage,
};
pub use resource::Resource;

/// Errors returned by the `fhir` target crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
