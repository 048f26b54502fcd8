//! The closed set of resources the converter produces.

use serde::Serialize;

use crate::administrative::{Device, Group, Location, Organization, Patient, Practitioner, Substance};
use crate::clinical::{
    AllergyIntolerance, Condition, DiagnosticReport, Encounter, FamilyMemberHistory,
    Immunization, Observation, Procedure,
};
use crate::composition::Composition;
use crate::ids::{Reference, ResourceId, ResourceKind};
use crate::medication::{Medication, MedicationDispense, MedicationStatement};

macro_rules! resource_enum {
    ($($kind:ident),+ $(,)?) => {
        /// Any converted resource, tagged by `resourceType` on the wire.
        #[derive(Clone, Debug, PartialEq, Serialize)]
        #[serde(tag = "resourceType")]
        pub enum Resource {
            $($kind($kind)),+
        }

        impl Resource {
            pub fn id(&self) -> &ResourceId {
                match self {
                    $(Resource::$kind(resource) => resource.id()),+
                }
            }
        }

        $(
            impl From<$kind> for Resource {
                fn from(value: $kind) -> Self {
                    Resource::$kind(value)
                }
            }
        )+
    };
}

resource_enum!(
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
);

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        self.id().kind()
    }

    pub fn reference(&self) -> Reference {
        self.id().reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cda2fhir_uuid::IdToken;

    #[test]
    fn resource_renders_resource_type_tag() {
        let id = ResourceId::new(ResourceKind::Substance, IdToken::new("s1").unwrap());
        let resource = Resource::from(Substance::new(id));
        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value["resourceType"], "Substance");
        assert_eq!(value["id"], "s1");
        assert_eq!(resource.kind(), ResourceKind::Substance);
    }
}
