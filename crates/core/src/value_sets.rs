//! Terminology translator.
//!
//! Maps HL7 v3 and SNOMED CT codes used by C-CDA onto FHIR enumerations. A code with no
//! mapping yields `None`; the caller leaves the target field unset.

use cda::NullFlavor;
use fhir::codes::{
    AdministrativeGender, AllergyIntoleranceCategory, AllergyIntoleranceSeverity,
    AllergyIntoleranceStatus, ConditionCategory, DataAbsentReason, DiagnosticReportStatus,
    EncounterClass, EncounterStatus, FamilyHistoryStatus, GroupType, ImmunizationStatus,
    MaritalStatus, MedicationDispenseStatus, MedicationStatementStatus, ObservationStatus,
    ParticipationType, ProcedureStatus,
};

/// Translates source vocabulary into FHIR enumerations.
pub trait ValueSetsTransformer: Send + Sync {
    fn administrative_gender(&self, code: &str) -> Option<AdministrativeGender>;
    fn allergy_category(&self, code: &str) -> Option<AllergyIntoleranceCategory>;
    fn allergy_status(&self, status_code: &str) -> Option<AllergyIntoleranceStatus>;
    fn allergy_severity(&self, code: &str) -> Option<AllergyIntoleranceSeverity>;
    fn condition_category(&self, problem_type: &str) -> Option<ConditionCategory>;
    fn data_absent_reason(&self, null_flavor: NullFlavor) -> Option<DataAbsentReason>;
    fn diagnostic_report_status(&self, status_code: &str) -> Option<DiagnosticReportStatus>;
    fn encounter_class(&self, code: &str) -> Option<EncounterClass>;
    fn encounter_status(&self, status_code: &str) -> Option<EncounterStatus>;
    fn family_history_status(&self, status_code: &str) -> Option<FamilyHistoryStatus>;
    fn group_type(&self, entity_class: &str) -> Option<GroupType>;
    fn immunization_status(&self, status_code: &str) -> Option<ImmunizationStatus>;
    fn marital_status(&self, code: &str) -> Option<MaritalStatus>;
    fn medication_dispense_status(&self, status_code: &str) -> Option<MedicationDispenseStatus>;
    fn medication_statement_status(&self, status_code: &str)
        -> Option<MedicationStatementStatus>;
    fn observation_status(&self, status_code: &str) -> Option<ObservationStatus>;
    fn participation_type(&self, type_code: &str) -> Option<ParticipationType>;
    fn procedure_status(&self, status_code: &str) -> Option<ProcedureStatus>;
}

/// Standard C-CDA value set mappings.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultValueSets;

/// Normalises an HL7 `ActStatus` code.
fn act_status(code: &str) -> String {
    code.trim().to_ascii_lowercase()
}

impl ValueSetsTransformer for DefaultValueSets {
    fn administrative_gender(&self, code: &str) -> Option<AdministrativeGender> {
        match code.trim().to_ascii_uppercase().as_str() {
            "M" => Some(AdministrativeGender::Male),
            "F" => Some(AdministrativeGender::Female),
            "UN" => Some(AdministrativeGender::Other),
            "UNK" => Some(AdministrativeGender::Unknown),
            _ => None,
        }
    }

    fn allergy_category(&self, code: &str) -> Option<AllergyIntoleranceCategory> {
        match code.trim() {
            // drug allergy, drug intolerance, propensity to adverse reactions to drug
            "416098002" | "59037007" | "419511003" => Some(AllergyIntoleranceCategory::Medication),
            // food allergy, food intolerance, propensity to adverse reactions to food
            "414285001" | "235719002" | "418471000" => Some(AllergyIntoleranceCategory::Food),
            // environmental allergy
            "426232007" => Some(AllergyIntoleranceCategory::Environment),
            // allergy to substance, propensity to adverse reactions (to substance)
            "419199007" | "420134006" | "418038007" => Some(AllergyIntoleranceCategory::Other),
            _ => None,
        }
    }

    fn allergy_status(&self, status_code: &str) -> Option<AllergyIntoleranceStatus> {
        match act_status(status_code).as_str() {
            "active" => Some(AllergyIntoleranceStatus::Active),
            "suspended" => Some(AllergyIntoleranceStatus::Inactive),
            "completed" => Some(AllergyIntoleranceStatus::Resolved),
            "aborted" => Some(AllergyIntoleranceStatus::Refuted),
            "nullified" => Some(AllergyIntoleranceStatus::EnteredInError),
            _ => None,
        }
    }

    fn allergy_severity(&self, code: &str) -> Option<AllergyIntoleranceSeverity> {
        match code.trim() {
            "255604002" | "371923003" | "L" => Some(AllergyIntoleranceSeverity::Mild),
            "6736007" | "M" => Some(AllergyIntoleranceSeverity::Moderate),
            "24484000" | "371924009" | "442452003" | "399166001" | "H" => {
                Some(AllergyIntoleranceSeverity::Severe)
            }
            _ => None,
        }
    }

    fn condition_category(&self, problem_type: &str) -> Option<ConditionCategory> {
        match problem_type.trim() {
            // complaint
            "409586006" => Some(ConditionCategory::Complaint),
            // symptom
            "418799008" => Some(ConditionCategory::Symptom),
            // finding, functional limitation, cognitive function finding
            "404684003" | "248536006" | "373930000" => Some(ConditionCategory::Finding),
            // diagnosis, condition, problem
            "282291009" | "64572001" | "55607006" => Some(ConditionCategory::Diagnosis),
            _ => None,
        }
    }

    fn data_absent_reason(&self, null_flavor: NullFlavor) -> Option<DataAbsentReason> {
        match null_flavor {
            NullFlavor::Ni | NullFlavor::Unk => Some(DataAbsentReason::Unknown),
            NullFlavor::Asku => Some(DataAbsentReason::Asked),
            NullFlavor::Nav => Some(DataAbsentReason::Temp),
            NullFlavor::Nask => Some(DataAbsentReason::NotAsked),
            NullFlavor::Msk => Some(DataAbsentReason::Masked),
            NullFlavor::Na | NullFlavor::Oth => Some(DataAbsentReason::Unsupported),
            NullFlavor::Ninf | NullFlavor::Pinf => Some(DataAbsentReason::NotANumber),
            NullFlavor::Trc | NullFlavor::Qs | NullFlavor::Np | NullFlavor::Other => None,
        }
    }

    fn diagnostic_report_status(&self, status_code: &str) -> Option<DiagnosticReportStatus> {
        match act_status(status_code).as_str() {
            "new" => Some(DiagnosticReportStatus::Registered),
            "active" | "held" | "suspended" => Some(DiagnosticReportStatus::Partial),
            "completed" => Some(DiagnosticReportStatus::Final),
            "aborted" | "cancelled" => Some(DiagnosticReportStatus::Cancelled),
            "nullified" => Some(DiagnosticReportStatus::EnteredInError),
            _ => None,
        }
    }

    fn encounter_class(&self, code: &str) -> Option<EncounterClass> {
        match code.trim().to_ascii_uppercase().as_str() {
            "IMP" | "ACUTE" | "NONAC" | "INPATIENT" => Some(EncounterClass::Inpatient),
            "AMB" | "AMBULATORY" => Some(EncounterClass::Ambulatory),
            "EMER" | "EMERGENCY" => Some(EncounterClass::Emergency),
            "HH" | "HOME" => Some(EncounterClass::Home),
            "FLD" | "FIELD" => Some(EncounterClass::Field),
            "SS" | "DAYTIME" => Some(EncounterClass::Daytime),
            "VR" | "VIRTUAL" => Some(EncounterClass::Virtual),
            "OUTPATIENT" | "OBSENC" => Some(EncounterClass::Outpatient),
            "OTHER" => Some(EncounterClass::Other),
            _ => None,
        }
    }

    fn encounter_status(&self, status_code: &str) -> Option<EncounterStatus> {
        match act_status(status_code).as_str() {
            "new" | "held" => Some(EncounterStatus::Planned),
            "active" => Some(EncounterStatus::InProgress),
            "suspended" => Some(EncounterStatus::OnLeave),
            "completed" => Some(EncounterStatus::Finished),
            "aborted" | "cancelled" | "nullified" => Some(EncounterStatus::Cancelled),
            _ => None,
        }
    }

    fn family_history_status(&self, status_code: &str) -> Option<FamilyHistoryStatus> {
        match act_status(status_code).as_str() {
            "completed" => Some(FamilyHistoryStatus::Completed),
            "active" | "new" | "held" | "suspended" => Some(FamilyHistoryStatus::Partial),
            "nullified" | "aborted" => Some(FamilyHistoryStatus::EnteredInError),
            _ => None,
        }
    }

    fn group_type(&self, entity_class: &str) -> Option<GroupType> {
        match entity_class.trim().to_ascii_uppercase().as_str() {
            "PSN" => Some(GroupType::Person),
            "ANM" => Some(GroupType::Animal),
            "DEV" | "CER" | "MODDV" => Some(GroupType::Device),
            "MMAT" => Some(GroupType::Medication),
            "MAT" | "CHEM" | "FOOD" => Some(GroupType::Substance),
            _ => None,
        }
    }

    fn immunization_status(&self, status_code: &str) -> Option<ImmunizationStatus> {
        match act_status(status_code).as_str() {
            "active" => Some(ImmunizationStatus::InProgress),
            "held" | "suspended" => Some(ImmunizationStatus::OnHold),
            "completed" => Some(ImmunizationStatus::Completed),
            "aborted" | "cancelled" => Some(ImmunizationStatus::Stopped),
            "nullified" => Some(ImmunizationStatus::EnteredInError),
            _ => None,
        }
    }

    fn marital_status(&self, code: &str) -> Option<MaritalStatus> {
        MaritalStatus::from_code(code.trim())
    }

    fn medication_dispense_status(&self, status_code: &str) -> Option<MedicationDispenseStatus> {
        match act_status(status_code).as_str() {
            "active" => Some(MedicationDispenseStatus::InProgress),
            "held" | "suspended" => Some(MedicationDispenseStatus::OnHold),
            "completed" => Some(MedicationDispenseStatus::Completed),
            "aborted" | "cancelled" => Some(MedicationDispenseStatus::Stopped),
            "nullified" => Some(MedicationDispenseStatus::EnteredInError),
            _ => None,
        }
    }

    fn medication_statement_status(
        &self,
        status_code: &str,
    ) -> Option<MedicationStatementStatus> {
        match act_status(status_code).as_str() {
            "active" | "suspended" => Some(MedicationStatementStatus::Active),
            "completed" | "aborted" => Some(MedicationStatementStatus::Completed),
            "new" | "held" => Some(MedicationStatementStatus::Intended),
            "nullified" => Some(MedicationStatementStatus::EnteredInError),
            _ => None,
        }
    }

    fn observation_status(&self, status_code: &str) -> Option<ObservationStatus> {
        match act_status(status_code).as_str() {
            "new" | "held" => Some(ObservationStatus::Registered),
            "active" | "suspended" => Some(ObservationStatus::Preliminary),
            "completed" => Some(ObservationStatus::Final),
            "aborted" | "cancelled" => Some(ObservationStatus::Cancelled),
            "nullified" => Some(ObservationStatus::EnteredInError),
            _ => None,
        }
    }

    fn participation_type(&self, type_code: &str) -> Option<ParticipationType> {
        ParticipationType::from_code(type_code.trim().to_ascii_uppercase().as_str())
    }

    fn procedure_status(&self, status_code: &str) -> Option<ProcedureStatus> {
        match act_status(status_code).as_str() {
            "active" | "new" | "held" | "suspended" => Some(ProcedureStatus::InProgress),
            "completed" => Some(ProcedureStatus::Completed),
            "aborted" | "cancelled" => Some(ProcedureStatus::Aborted),
            "nullified" => Some(ProcedureStatus::EnteredInError),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_have_no_mapping() {
        let vst = DefaultValueSets;
        assert_eq!(vst.administrative_gender("X"), None);
        assert_eq!(vst.encounter_status("obsolete"), None);
        assert_eq!(vst.allergy_severity("12345"), None);
        assert_eq!(vst.condition_category(""), None);
    }

    #[test]
    fn status_codes_are_case_insensitive() {
        let vst = DefaultValueSets;
        assert_eq!(vst.procedure_status("Completed"), Some(ProcedureStatus::Completed));
        assert_eq!(vst.encounter_status(" active "), Some(EncounterStatus::InProgress));
    }

    #[test]
    fn gender_and_marital_status_follow_hl7_codes() {
        let vst = DefaultValueSets;
        assert_eq!(vst.administrative_gender("F"), Some(AdministrativeGender::Female));
        assert_eq!(vst.marital_status("M"), Some(MaritalStatus::Married));
        assert_eq!(vst.marital_status("Q"), None);
    }

    #[test]
    fn snomed_severity_and_category_codes_map() {
        let vst = DefaultValueSets;
        assert_eq!(vst.allergy_severity("6736007"), Some(AllergyIntoleranceSeverity::Moderate));
        assert_eq!(
            vst.allergy_category("416098002"),
            Some(AllergyIntoleranceCategory::Medication)
        );
        assert_eq!(vst.condition_category("282291009"), Some(ConditionCategory::Diagnosis));
    }

    #[test]
    fn null_flavor_maps_to_data_absent_reason() {
        let vst = DefaultValueSets;
        assert_eq!(vst.data_absent_reason(NullFlavor::Asku), Some(DataAbsentReason::Asked));
        assert_eq!(vst.data_absent_reason(NullFlavor::Msk), Some(DataAbsentReason::Masked));
        assert_eq!(vst.data_absent_reason(NullFlavor::Other), None);
    }

    #[test]
    fn participation_type_uses_v3_codes() {
        let vst = DefaultValueSets;
        assert_eq!(vst.participation_type("PRF"), Some(ParticipationType::Performer));
        assert_eq!(vst.participation_type("LOC"), None);
    }
}
