//! Resource identity and references.
//!
//! A converted resource is identified by its [`ResourceKind`] plus an opaque [`IdToken`]. The
//! pair is assigned exactly once, when the resource is created, and renders as `Kind/token`.
//! A [`Reference`] points at such an identity and serialises as `{"reference": "Kind/token"}`.

use cda2fhir_uuid::IdToken;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::FhirError;

/// The target resource types produced by the converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Patient,
    Practitioner,
    Organization,
    Location,
    Encounter,
    Condition,
    AllergyIntolerance,
    Procedure,
    Observation,
    Immunization,
    Medication,
    MedicationStatement,
    MedicationDispense,
    Substance,
    Device,
    DiagnosticReport,
    FamilyMemberHistory,
    Composition,
    Group,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 19] = [
        ResourceKind::Patient,
        ResourceKind::Practitioner,
        ResourceKind::Organization,
        ResourceKind::Location,
        ResourceKind::Encounter,
        ResourceKind::Condition,
        ResourceKind::AllergyIntolerance,
        ResourceKind::Procedure,
        ResourceKind::Observation,
        ResourceKind::Immunization,
        ResourceKind::Medication,
        ResourceKind::MedicationStatement,
        ResourceKind::MedicationDispense,
        ResourceKind::Substance,
        ResourceKind::Device,
        ResourceKind::DiagnosticReport,
        ResourceKind::FamilyMemberHistory,
        ResourceKind::Composition,
        ResourceKind::Group,
    ];

    /// The FHIR `resourceType`.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Patient => "Patient",
            ResourceKind::Practitioner => "Practitioner",
            ResourceKind::Organization => "Organization",
            ResourceKind::Location => "Location",
            ResourceKind::Encounter => "Encounter",
            ResourceKind::Condition => "Condition",
            ResourceKind::AllergyIntolerance => "AllergyIntolerance",
            ResourceKind::Procedure => "Procedure",
            ResourceKind::Observation => "Observation",
            ResourceKind::Immunization => "Immunization",
            ResourceKind::Medication => "Medication",
            ResourceKind::MedicationStatement => "MedicationStatement",
            ResourceKind::MedicationDispense => "MedicationDispense",
            ResourceKind::Substance => "Substance",
            ResourceKind::Device => "Device",
            ResourceKind::DiagnosticReport => "DiagnosticReport",
            ResourceKind::FamilyMemberHistory => "FamilyMemberHistory",
            ResourceKind::Composition => "Composition",
            ResourceKind::Group => "Group",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = FhirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| FhirError::InvalidInput(format!("unknown resource type '{s}'")))
    }
}

/// Type-qualified identity of a resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    kind: ResourceKind,
    token: IdToken,
}

impl ResourceId {
    pub fn new(kind: ResourceKind, token: IdToken) -> Self {
        Self { kind, token }
    }

    /// Parses `Kind/token`.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidInput`] if the text has no `/`, names an unknown resource
    /// type, or carries an invalid token.
    pub fn parse(text: &str) -> Result<Self, FhirError> {
        let (kind, token) = text
            .split_once('/')
            .ok_or_else(|| FhirError::InvalidInput(format!("expected Kind/token, got '{text}'")))?;
        let kind = kind.parse()?;
        let token = IdToken::new(token)
            .map_err(|e| FhirError::InvalidInput(format!("invalid token in '{text}': {e}")))?;
        Ok(Self { kind, token })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn token(&self) -> &IdToken {
        &self.token
    }

    pub fn reference(&self) -> Reference {
        Reference::to(self.clone())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.token)
    }
}

/// Serialises a resource's own `id` as the bare token.
pub(crate) fn serialize_token<S>(id: &ResourceId, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(id.token.as_str())
}

/// A literal reference to another resource of the same graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Reference {
    target: ResourceId,
}

impl Reference {
    pub fn to(target: ResourceId) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &ResourceId {
        &self.target
    }
}

impl From<&ResourceId> for Reference {
    fn from(value: &ResourceId) -> Self {
        Reference::to(value.clone())
    }
}

impl Serialize for Reference {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct ReferenceWire {
            reference: String,
        }

        ReferenceWire {
            reference: self.target.to_string(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_id_renders_kind_and_token() {
        let id = ResourceId::new(ResourceKind::Patient, IdToken::new("0").unwrap());
        assert_eq!(id.to_string(), "Patient/0");
    }

    #[test]
    fn resource_id_parse_round_trips() {
        let id = ResourceId::parse("MedicationStatement/42").expect("should parse");
        assert_eq!(id.kind(), ResourceKind::MedicationStatement);
        assert_eq!(id.token().as_str(), "42");
    }

    #[test]
    fn resource_id_parse_rejects_unknown_kind() {
        let err = ResourceId::parse("Basic/1").expect_err("should reject unknown kind");
        match err {
            FhirError::InvalidInput(msg) => assert!(msg.contains("Basic")),
            other => panic!("expected InvalidInput error, got {other:?}"),
        }
        assert!(ResourceId::parse("Patient").is_err());
        assert!(ResourceId::parse("Patient/a b").is_err());
    }

    #[test]
    fn reference_serialises_as_literal_reference() {
        let reference = ResourceId::parse("Practitioner/7").unwrap().reference();
        let json = serde_json::to_string(&reference).unwrap();
        assert_eq!(json, r#"{"reference":"Practitioner/7"}"#);
    }

    #[test]
    fn every_kind_parses_from_its_name() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
        }
    }
}
