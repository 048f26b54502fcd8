//! Clinical resources.
//!
//! Choice elements (`value[x]`, `onset[x]`, ...) that the converter only ever fills with one
//! type are modelled as a concrete field named after that type, e.g. `onset_date_time`
//! renders as `onsetDateTime`. `Observation.value[x]` carries several types and is modelled
//! as [`ObservationValue`].

use serde::Serialize;

use crate::codes::{
    AdministrativeGender, AllergyIntoleranceCategory, AllergyIntoleranceSeverity,
    AllergyIntoleranceStatus, DiagnosticReportStatus, EncounterClass, EncounterStatus,
    FamilyHistoryStatus, ImmunizationStatus, ObservationStatus, ProcedureStatus,
};
use crate::datatypes::{
    Age, Attachment, CodeableConcept, Date, DateTime, Identifier, Instant, Period, Quantity,
    Range, Ratio,
};
use crate::ids::Reference;

// ============================================================================
// Encounter
// ============================================================================

fhir_resource! {
    pub struct Encounter {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<EncounterStatus>,
        #[serde(rename = "class", skip_serializing_if = "Option::is_none")]
        pub class_code: Option<EncounterClass>,
        #[serde(rename = "type", skip_serializing_if = "Vec::is_empty")]
        pub type_code: Vec<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub priority: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub patient: Option<Reference>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub participant: Vec<EncounterParticipant>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub period: Option<Period>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub reason: Vec<CodeableConcept>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub location: Vec<EncounterLocation>,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterParticipant {
    #[serde(rename = "type", skip_serializing_if = "Vec::is_empty")]
    pub type_code: Vec<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual: Option<Reference>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterLocation {
    pub location: Reference,
}

// ============================================================================
// Condition
// ============================================================================

fhir_resource! {
    pub struct Condition {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub patient: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub encounter: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub asserter: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub date_recorded: Option<Date>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub code: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub category: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub onset_date_time: Option<DateTime>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub abatement_date_time: Option<DateTime>,
    }
}

// ============================================================================
// AllergyIntolerance
// ============================================================================

fhir_resource! {
    pub struct AllergyIntolerance {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub onset: Option<DateTime>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub recorder: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub patient: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub substance: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<AllergyIntoleranceStatus>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub category: Option<AllergyIntoleranceCategory>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub reaction: Vec<AllergyIntoleranceReaction>,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergyIntoleranceReaction {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub manifestation: Vec<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<AllergyIntoleranceSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset: Option<DateTime>,
}

// ============================================================================
// Procedure
// ============================================================================

fhir_resource! {
    pub struct Procedure {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub subject: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<ProcedureStatus>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub code: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub body_site: Vec<CodeableConcept>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub performer: Vec<ProcedurePerformer>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub performed_period: Option<Period>,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedurePerformer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<Reference>,
}

// ============================================================================
// Observation
// ============================================================================

/// `Observation.value[x]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ObservationValue {
    #[serde(rename = "valueCodeableConcept")]
    CodeableConcept(CodeableConcept),
    #[serde(rename = "valueQuantity")]
    Quantity(Quantity),
    #[serde(rename = "valueString")]
    String(String),
    #[serde(rename = "valueRange")]
    Range(Range),
    #[serde(rename = "valueRatio")]
    Ratio(Ratio),
    #[serde(rename = "valueAttachment")]
    Attachment(Attachment),
    #[serde(rename = "valueDateTime")]
    DateTime(DateTime),
}

fhir_resource! {
    pub struct Observation {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<ObservationStatus>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub category: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub code: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub subject: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub encounter: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub effective_period: Option<Period>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub issued: Option<Instant>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub performer: Vec<Reference>,
        #[serde(flatten)]
        pub value: Option<ObservationValue>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub data_absent_reason: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub interpretation: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub body_site: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub method: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub reference_range: Vec<ObservationReferenceRange>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub device: Option<Reference>,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationReferenceRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ObservationReferenceRange {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ============================================================================
// DiagnosticReport
// ============================================================================

fhir_resource! {
    pub struct DiagnosticReport {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<DiagnosticReportStatus>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub code: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub subject: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub effective_period: Option<Period>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub issued: Option<Instant>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub performer: Option<Reference>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub result: Vec<Reference>,
    }
}

// ============================================================================
// Immunization
// ============================================================================

fhir_resource! {
    pub struct Immunization {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<ImmunizationStatus>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub date: Option<DateTime>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub vaccine_code: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub patient: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub was_not_given: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub performer: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub manufacturer: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub lot_number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub site: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub route: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub dose_quantity: Option<Quantity>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub explanation: Option<ImmunizationExplanation>,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImmunizationExplanation {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reason: Vec<CodeableConcept>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reason_not_given: Vec<CodeableConcept>,
}

// ============================================================================
// FamilyMemberHistory
// ============================================================================

fhir_resource! {
    pub struct FamilyMemberHistory {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub patient: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<FamilyHistoryStatus>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub relationship: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub gender: Option<AdministrativeGender>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub born_date: Option<Date>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub deceased_boolean: Option<bool>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub condition: Vec<FamilyMemberHistoryCondition>,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMemberHistoryCondition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CodeableConcept>,
    /// `onset[x]` as an `Age`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset_quantity: Option<Age>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ResourceId, ResourceKind};
    use cda2fhir_uuid::IdToken;

    fn id(kind: ResourceKind, token: &str) -> ResourceId {
        ResourceId::new(kind, IdToken::new(token).unwrap())
    }

    #[test]
    fn observation_value_renders_as_choice_element() {
        let mut observation = Observation::new(id(ResourceKind::Observation, "1"));
        observation.value = Some(ObservationValue::Quantity(Quantity {
            value: Some(120.0),
            unit: Some("mm[Hg]".into()),
            ..Default::default()
        }));

        let value = serde_json::to_value(&observation).unwrap();
        assert_eq!(value["valueQuantity"]["value"], 120.0);
        assert!(value.get("value").is_none());
    }

    #[test]
    fn unset_observation_value_renders_nothing() {
        let observation = Observation::new(id(ResourceKind::Observation, "1"));
        let json = serde_json::to_string(&observation).unwrap();
        assert_eq!(json, r#"{"id":"1"}"#);
    }

    #[test]
    fn condition_onset_renders_as_onset_date_time() {
        let mut condition = Condition::new(id(ResourceKind::Condition, "c"));
        condition.onset_date_time = Some(DateTime::new("2008-01-03"));
        let value = serde_json::to_value(&condition).unwrap();
        assert_eq!(value["onsetDateTime"], "2008-01-03");
    }

    #[test]
    fn encounter_class_and_type_render_under_reserved_names() {
        let mut encounter = Encounter::new(id(ResourceKind::Encounter, "e"));
        encounter.class_code = Some(EncounterClass::Ambulatory);
        encounter.type_code.push(CodeableConcept {
            text: Some("Checkup".into()),
            ..Default::default()
        });
        let value = serde_json::to_value(&encounter).unwrap();
        assert_eq!(value["class"], "ambulatory");
        assert_eq!(value["type"][0]["text"], "Checkup");
    }
}
