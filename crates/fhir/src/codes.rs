//! FHIR DSTU2 code enumerations.
//!
//! Each enumeration serialises as its FHIR code. The terminology translator in the converter
//! maps source vocabulary onto these values and yields nothing for unknown codes.

use crate::datatypes::{CodeableConcept, Coding};

pub const CONDITION_CATEGORY_SYSTEM: &str = "http://hl7.org/fhir/condition-category";
pub const MARITAL_STATUS_SYSTEM: &str = "http://hl7.org/fhir/v3/MaritalStatus";
pub const DATA_ABSENT_REASON_SYSTEM: &str = "http://hl7.org/fhir/data-absent-reason";
pub const PARTICIPATION_TYPE_SYSTEM: &str = "http://hl7.org/fhir/v3/ParticipationType";

// ============================================================================
// Statuses
// ============================================================================

fhir_codes! {
    pub enum AllergyIntoleranceStatus {
        Active => "active",
        Unconfirmed => "unconfirmed",
        Confirmed => "confirmed",
        Inactive => "inactive",
        Resolved => "resolved",
        Refuted => "refuted",
        EnteredInError => "entered-in-error",
    }
}

fhir_codes! {
    pub enum EncounterStatus {
        Planned => "planned",
        Arrived => "arrived",
        InProgress => "in-progress",
        OnLeave => "onleave",
        Finished => "finished",
        Cancelled => "cancelled",
    }
}

fhir_codes! {
    pub enum MedicationStatementStatus {
        Active => "active",
        Completed => "completed",
        EnteredInError => "entered-in-error",
        Intended => "intended",
    }
}

fhir_codes! {
    pub enum MedicationDispenseStatus {
        InProgress => "in-progress",
        OnHold => "on-hold",
        Completed => "completed",
        EnteredInError => "entered-in-error",
        Stopped => "stopped",
    }
}

fhir_codes! {
    pub enum ProcedureStatus {
        InProgress => "in-progress",
        Aborted => "aborted",
        Completed => "completed",
        EnteredInError => "entered-in-error",
    }
}

fhir_codes! {
    pub enum ObservationStatus {
        Registered => "registered",
        Preliminary => "preliminary",
        Final => "final",
        Amended => "amended",
        Cancelled => "cancelled",
        EnteredInError => "entered-in-error",
        Unknown => "unknown",
    }
}

fhir_codes! {
    pub enum DiagnosticReportStatus {
        Registered => "registered",
        Partial => "partial",
        Final => "final",
        Corrected => "corrected",
        Appended => "appended",
        Cancelled => "cancelled",
        EnteredInError => "entered-in-error",
    }
}

fhir_codes! {
    pub enum FamilyHistoryStatus {
        Partial => "partial",
        Completed => "completed",
        EnteredInError => "entered-in-error",
        HealthUnknown => "health-unknown",
    }
}

fhir_codes! {
    /// Immunization status uses the medication administration status codes.
    pub enum ImmunizationStatus {
        InProgress => "in-progress",
        OnHold => "on-hold",
        Completed => "completed",
        EnteredInError => "entered-in-error",
        Stopped => "stopped",
    }
}

fhir_codes! {
    pub enum CompositionStatus {
        Preliminary => "preliminary",
        Final => "final",
        Amended => "amended",
        EnteredInError => "entered-in-error",
    }
}

// ============================================================================
// Allergy
// ============================================================================

fhir_codes! {
    pub enum AllergyIntoleranceCategory {
        Food => "food",
        Medication => "medication",
        Environment => "environment",
        Other => "other",
    }
}

fhir_codes! {
    /// Severity of a single allergic reaction.
    pub enum AllergyIntoleranceSeverity {
        Mild => "mild",
        Moderate => "moderate",
        Severe => "severe",
    }
}

// ============================================================================
// Encounter and participation
// ============================================================================

fhir_codes! {
    pub enum EncounterClass {
        Inpatient => "inpatient",
        Outpatient => "outpatient",
        Ambulatory => "ambulatory",
        Emergency => "emergency",
        Home => "home",
        Field => "field",
        Daytime => "daytime",
        Virtual => "virtual",
        Other => "other",
    }
}

fhir_codes! {
    /// HL7 v3 participation types used on encounter participants.
    pub enum ParticipationType {
        Performer => "PRF",
        PrimaryPerformer => "PPRF",
        SecondaryPerformer => "SPRF",
        Admitter => "ADM",
        Attender => "ATND",
        Consultant => "CON",
        Discharger => "DIS",
        Referrer => "REF",
        Participation => "PART",
    }
}

impl ParticipationType {
    pub fn display(self) -> &'static str {
        match self {
            ParticipationType::Performer => "performer",
            ParticipationType::PrimaryPerformer => "primary performer",
            ParticipationType::SecondaryPerformer => "secondary performer",
            ParticipationType::Admitter => "admitter",
            ParticipationType::Attender => "attender",
            ParticipationType::Consultant => "consultant",
            ParticipationType::Discharger => "discharger",
            ParticipationType::Referrer => "referrer",
            ParticipationType::Participation => "participation",
        }
    }

    pub fn to_coding(self) -> Coding {
        Coding::new(PARTICIPATION_TYPE_SYSTEM, self.as_code(), Some(self.display()))
    }
}

// ============================================================================
// Condition
// ============================================================================

fhir_codes! {
    pub enum ConditionCategory {
        Complaint => "complaint",
        Symptom => "symptom",
        Finding => "finding",
        Diagnosis => "diagnosis",
    }
}

impl ConditionCategory {
    pub fn display(self) -> &'static str {
        match self {
            ConditionCategory::Complaint => "Complaint",
            ConditionCategory::Symptom => "Symptom",
            ConditionCategory::Finding => "Finding",
            ConditionCategory::Diagnosis => "Diagnosis",
        }
    }

    pub fn to_codeable_concept(self) -> CodeableConcept {
        CodeableConcept::from_coding(Coding::new(
            CONDITION_CATEGORY_SYSTEM,
            self.as_code(),
            Some(self.display()),
        ))
    }
}

// ============================================================================
// Demographics
// ============================================================================

fhir_codes! {
    pub enum AdministrativeGender {
        Male => "male",
        Female => "female",
        Other => "other",
        Unknown => "unknown",
    }
}

fhir_codes! {
    pub enum MaritalStatus {
        Annulled => "A",
        Divorced => "D",
        Interlocutory => "I",
        LegallySeparated => "L",
        Married => "M",
        Polygamous => "P",
        NeverMarried => "S",
        DomesticPartner => "T",
        Widowed => "W",
        Unknown => "UNK",
    }
}

impl MaritalStatus {
    pub fn display(self) -> &'static str {
        match self {
            MaritalStatus::Annulled => "Annulled",
            MaritalStatus::Divorced => "Divorced",
            MaritalStatus::Interlocutory => "Interlocutory",
            MaritalStatus::LegallySeparated => "Legally Separated",
            MaritalStatus::Married => "Married",
            MaritalStatus::Polygamous => "Polygamous",
            MaritalStatus::NeverMarried => "Never Married",
            MaritalStatus::DomesticPartner => "Domestic partner",
            MaritalStatus::Widowed => "Widowed",
            MaritalStatus::Unknown => "unknown",
        }
    }

    pub fn to_codeable_concept(self) -> CodeableConcept {
        CodeableConcept::from_coding(Coding::new(
            MARITAL_STATUS_SYSTEM,
            self.as_code(),
            Some(self.display()),
        ))
    }
}

// ============================================================================
// Miscellaneous
// ============================================================================

fhir_codes! {
    pub enum DataAbsentReason {
        Unknown => "unknown",
        Asked => "asked",
        Temp => "temp",
        NotAsked => "not-asked",
        Masked => "masked",
        Unsupported => "unsupported",
        AsText => "astext",
        Error => "error",
        NotANumber => "NaN",
    }
}

impl DataAbsentReason {
    pub fn to_coding(self) -> Coding {
        Coding::new(DATA_ABSENT_REASON_SYSTEM, self.as_code(), None)
    }
}

fhir_codes! {
    pub enum AttestationMode {
        Personal => "personal",
        Professional => "professional",
        Legal => "legal",
        Official => "official",
    }
}

fhir_codes! {
    pub enum GroupType {
        Person => "person",
        Animal => "animal",
        Practitioner => "practitioner",
        Device => "device",
        Medication => "medication",
        Substance => "substance",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialise_as_fhir_codes() {
        let json = serde_json::to_string(&EncounterStatus::InProgress).unwrap();
        assert_eq!(json, r#""in-progress""#);
        assert_eq!(DataAbsentReason::NotANumber.as_code(), "NaN");
    }

    #[test]
    fn from_code_is_exact() {
        assert_eq!(
            AllergyIntoleranceStatus::from_code("entered-in-error"),
            Some(AllergyIntoleranceStatus::EnteredInError)
        );
        assert_eq!(AllergyIntoleranceStatus::from_code("Active"), None);
    }

    #[test]
    fn participation_type_coding_carries_system_and_display() {
        let coding = ParticipationType::Performer.to_coding();
        assert_eq!(coding.system.as_deref(), Some(PARTICIPATION_TYPE_SYSTEM));
        assert_eq!(coding.code.as_deref(), Some("PRF"));
        assert_eq!(coding.display.as_deref(), Some("performer"));
    }

    #[test]
    fn condition_category_concept_uses_category_system() {
        let concept = ConditionCategory::Diagnosis.to_codeable_concept();
        assert_eq!(concept.first_code(), Some("diagnosis"));
        assert_eq!(
            concept.coding[0].system.as_deref(),
            Some(CONDITION_CATEGORY_SYSTEM)
        );
    }
}
