//! Administrative resources: people, organisations, places, things.

use serde::Serialize;

use crate::codes::{AdministrativeGender, GroupType};
use crate::datatypes::{Address, CodeableConcept, ContactPoint, Date, Extension, HumanName, Identifier};
use crate::ids::Reference;

fhir_resource! {
    pub struct Patient {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub extension: Vec<Extension>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub name: Vec<HumanName>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub telecom: Vec<ContactPoint>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub gender: Option<AdministrativeGender>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub birth_date: Option<Date>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub address: Vec<Address>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub marital_status: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub contact: Vec<PatientContact>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub communication: Vec<PatientCommunication>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub managing_organization: Option<Reference>,
    }
}

/// A guardian or other contact party of a patient.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientContact {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relationship: Vec<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<HumanName>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientCommunication {
    pub language: CodeableConcept,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred: Option<bool>,
}

fhir_resource! {
    pub struct Practitioner {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub name: Option<HumanName>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub telecom: Vec<ContactPoint>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub address: Vec<Address>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub practitioner_role: Vec<PractitionerRole>,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PractitionerRole {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managing_organization: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<CodeableConcept>,
}

fhir_resource! {
    pub struct Organization {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub telecom: Vec<ContactPoint>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub address: Vec<Address>,
    }
}

fhir_resource! {
    pub struct Location {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        pub type_code: Option<CodeableConcept>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub telecom: Vec<ContactPoint>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub address: Option<Address>,
    }
}

fhir_resource! {
    pub struct Substance {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub code: Option<CodeableConcept>,
    }
}

fhir_resource! {
    pub struct Device {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        pub type_code: Option<CodeableConcept>,
    }
}

fhir_resource! {
    /// A kind of entity rather than a specific one (`actual` is false).
    pub struct Group {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        pub group_type: Option<GroupType>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub actual: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub code: Option<CodeableConcept>,
    }
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
    fn new_resource_has_only_an_id() {
        let organization = Organization::new(id(ResourceKind::Organization, "1"));
        let json = serde_json::to_string(&organization).unwrap();
        assert_eq!(json, r#"{"id":"1"}"#);
    }

    #[test]
    fn patient_fields_render_camel_case() {
        let mut patient = Patient::new(id(ResourceKind::Patient, "p"));
        patient.birth_date = Some(Date::new("1975-05-01"));
        patient.gender = Some(AdministrativeGender::Female);
        patient.managing_organization = Some(id(ResourceKind::Organization, "o").reference());

        let value = serde_json::to_value(&patient).unwrap();
        assert_eq!(value["birthDate"], "1975-05-01");
        assert_eq!(value["gender"], "female");
        assert_eq!(value["managingOrganization"]["reference"], "Organization/o");
    }

    #[test]
    fn type_fields_render_as_type() {
        let mut group = Group::new(id(ResourceKind::Group, "g"));
        group.group_type = Some(GroupType::Medication);
        group.actual = Some(false);
        let value = serde_json::to_value(&group).unwrap();
        assert_eq!(value["type"], "medication");
        assert_eq!(value["actual"], false);
    }
}
