//! Medication resources.

use serde::Serialize;

use crate::codes::{MedicationDispenseStatus, MedicationStatementStatus};
use crate::datatypes::{CodeableConcept, DateTime, Identifier, Period, Quantity, Range, Ratio, Timing};
use crate::ids::Reference;

fhir_resource! {
    pub struct Medication {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub code: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub manufacturer: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub product: Option<MedicationProduct>,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationProduct {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ingredient: Vec<MedicationIngredient>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationIngredient {
    /// A `Substance` or `Medication`.
    pub item: Reference,
}

fhir_resource! {
    pub struct MedicationStatement {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub patient: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub information_source: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<MedicationStatementStatus>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub was_not_taken: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub reason_for_use_reference: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub effective_period: Option<Period>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub medication_reference: Option<Reference>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub dosage: Vec<MedicationStatementDosage>,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationStatementDosage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_quantity: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_dose_per_period: Option<Ratio>,
}

fhir_resource! {
    pub struct MedicationDispense {
        /// Single identifier; the last source identifier wins.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub identifier: Option<Identifier>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<MedicationDispenseStatus>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub patient: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub dispenser: Option<Reference>,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        pub type_code: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub quantity: Option<Quantity>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub medication_reference: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub when_prepared: Option<DateTime>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub when_handed_over: Option<DateTime>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub dosage_instruction: Vec<DispenseDosageInstruction>,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispenseDosageInstruction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_quantity: Option<Quantity>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ResourceId, ResourceKind};
    use cda2fhir_uuid::IdToken;

    #[test]
    fn statement_renders_reference_choice_fields() {
        let id = ResourceId::new(ResourceKind::MedicationStatement, IdToken::new("1").unwrap());
        let condition = ResourceId::new(ResourceKind::Condition, IdToken::new("2").unwrap());
        let mut statement = MedicationStatement::new(id);
        statement.was_not_taken = Some(false);
        statement.reason_for_use_reference = Some(condition.reference());
        statement.dosage.push(MedicationStatementDosage::default());

        let value = serde_json::to_value(&statement).unwrap();
        assert_eq!(value["wasNotTaken"], false);
        assert_eq!(value["reasonForUseReference"]["reference"], "Condition/2");
        assert_eq!(value["dosage"].as_array().map(Vec::len), Some(1));
    }
}
