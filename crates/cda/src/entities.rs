//! CDA roles, entities and participations.
//!
//! These are the "who" and "what" of a clinical statement: authors and performers with their
//! organizations, the patient role, playing entities of participants, and the manufactured
//! products consumed by substance administrations and supplies.

use crate::datatypes::{Ad, Bl, Cd, Ii, IvlTs, NullFlavor, On, Pn, St, Tel, Ts};
use serde::Deserialize;

/// `Participant2/@typeCode` for a location participation.
pub const PARTICIPATION_LOCATION: &str = "LOC";

/// `ParticipantRole/@classCode` of a service delivery location.
pub const ROLE_CLASS_SERVICE_DELIVERY_LOCATION: &str = "SDLOC";

/// `Entity/@determinerCode` for a kind of entity rather than an instance.
pub const DETERMINER_KIND: &str = "KIND";

// ============================================================================
// People and organizations
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Person {
    pub names: Vec<Pn>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Organization {
    pub ids: Vec<Ii>,
    pub names: Vec<On>,
    pub telecoms: Vec<Tel>,
    pub addrs: Vec<Ad>,
    pub null_flavor: Option<NullFlavor>,
}

/// Custodian organizations carry a single name.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustodianOrganization {
    pub ids: Vec<Ii>,
    pub name: Option<On>,
    pub telecoms: Vec<Tel>,
    pub addrs: Vec<Ad>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssignedAuthor {
    pub ids: Vec<Ii>,
    pub code: Option<Cd>,
    pub addrs: Vec<Ad>,
    pub telecoms: Vec<Tel>,
    pub assigned_person: Option<Person>,
    pub represented_organization: Option<Organization>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssignedEntity {
    pub ids: Vec<Ii>,
    pub code: Option<Cd>,
    pub addrs: Vec<Ad>,
    pub telecoms: Vec<Tel>,
    pub assigned_person: Option<Person>,
    pub represented_organizations: Vec<Organization>,
    pub null_flavor: Option<NullFlavor>,
}

// ============================================================================
// Participant roles and playing entities
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayingEntity {
    pub code: Option<Cd>,
    pub names: Vec<Pn>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayingDevice {
    pub code: Option<Cd>,
    pub manufacturer_model_name: Option<St>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParticipantRole {
    pub ids: Vec<Ii>,
    pub class_code: Option<String>,
    pub code: Option<Cd>,
    pub addrs: Vec<Ad>,
    pub telecoms: Vec<Tel>,
    pub playing_entity: Option<PlayingEntity>,
    pub playing_device: Option<PlayingDevice>,
    pub null_flavor: Option<NullFlavor>,
}

impl ParticipantRole {
    pub fn is_service_delivery_location(&self) -> bool {
        self.class_code.as_deref() == Some(ROLE_CLASS_SERVICE_DELIVERY_LOCATION)
    }

    /// A product instance is a role played by a device.
    pub fn is_product_instance(&self) -> bool {
        self.playing_device.is_some()
    }
}

/// Subject entity of a non-person participation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Entity {
    pub ids: Vec<Ii>,
    /// `EntityClassRoot` code (`PSN`, `ANM`, `DEV`, `MMAT`, ...).
    pub class_code: Option<String>,
    pub determiner_code: Option<String>,
    pub code: Option<Cd>,
    pub null_flavor: Option<NullFlavor>,
}

impl Entity {
    pub fn is_kind(&self) -> bool {
        self.determiner_code.as_deref() == Some(DETERMINER_KIND)
    }
}

// ============================================================================
// Products
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Material {
    pub code: Option<Cd>,
    pub name: Option<String>,
    pub lot_number_text: Option<St>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManufacturedProduct {
    pub ids: Vec<Ii>,
    pub manufactured_material: Option<Material>,
    pub manufacturer_organization: Option<Organization>,
    pub null_flavor: Option<NullFlavor>,
}

/// `consumable` of a substance administration, and `product` of a supply.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Consumable {
    pub manufactured_product: Option<ManufacturedProduct>,
    pub null_flavor: Option<NullFlavor>,
}

// ============================================================================
// Patient
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Guardian {
    pub ids: Vec<Ii>,
    pub code: Option<Cd>,
    pub addrs: Vec<Ad>,
    pub telecoms: Vec<Tel>,
    pub guardian_person: Option<Person>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageCommunication {
    pub language_code: Option<Cd>,
    pub mode_code: Option<Cd>,
    pub preference_ind: Option<Bl>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Place {
    pub name: Option<String>,
    pub addr: Option<Ad>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Birthplace {
    pub place: Option<Place>,
    pub null_flavor: Option<NullFlavor>,
}

/// `recordTarget/patientRole/patient`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PatientPerson {
    pub names: Vec<Pn>,
    pub administrative_gender_code: Option<Cd>,
    pub birth_time: Option<Ts>,
    pub marital_status_code: Option<Cd>,
    pub religious_affiliation_code: Option<Cd>,
    pub race_code: Option<Cd>,
    pub ethnic_group_code: Option<Cd>,
    pub guardians: Vec<Guardian>,
    pub birthplace: Option<Birthplace>,
    pub language_communications: Vec<LanguageCommunication>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PatientRole {
    pub ids: Vec<Ii>,
    pub addrs: Vec<Ad>,
    pub telecoms: Vec<Tel>,
    pub patient: Option<PatientPerson>,
    pub provider_organization: Option<Organization>,
    pub null_flavor: Option<NullFlavor>,
}

// ============================================================================
// Family history subject
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubjectPerson {
    pub names: Vec<Pn>,
    pub administrative_gender_code: Option<Cd>,
    pub birth_time: Option<Ts>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelatedSubject {
    /// Relationship of the subject to the patient (`MTH`, `FTH`, ...).
    pub code: Option<Cd>,
    pub subject: Option<SubjectPerson>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Subject {
    pub related_subject: Option<RelatedSubject>,
    pub null_flavor: Option<NullFlavor>,
}

// ============================================================================
// Participations
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Author {
    pub time: Option<Ts>,
    pub assigned_author: Option<AssignedAuthor>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Performer2 {
    pub time: Option<IvlTs>,
    pub assigned_entity: Option<AssignedEntity>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Participant2 {
    /// `ParticipationType` code (`LOC`, `CSM`, `PRD`, `DEV`, ...).
    pub type_code: Option<String>,
    pub time: Option<IvlTs>,
    pub participant_role: Option<ParticipantRole>,
    pub null_flavor: Option<NullFlavor>,
}

impl Participant2 {
    pub fn is_location(&self) -> bool {
        self.type_code.as_deref() == Some(PARTICIPATION_LOCATION)
    }
}

/// `legalAuthenticator` and `authenticator` share a shape.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Authenticator {
    pub time: Option<Ts>,
    pub signature_code: Option<Cd>,
    pub assigned_entity: Option<AssignedEntity>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssignedCustodian {
    pub represented_custodian_organization: Option<CustodianOrganization>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Custodian {
    pub assigned_custodian: Option<AssignedCustodian>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecordTarget {
    pub patient_role: Option<PatientRole>,
    pub null_flavor: Option<NullFlavor>,
}

crate::impl_null_flavored!(
    Person,
    Organization,
    CustodianOrganization,
    AssignedAuthor,
    AssignedEntity,
    PlayingEntity,
    PlayingDevice,
    ParticipantRole,
    Entity,
    Material,
    ManufacturedProduct,
    Consumable,
    Guardian,
    LanguageCommunication,
    Place,
    Birthplace,
    PatientPerson,
    PatientRole,
    SubjectPerson,
    RelatedSubject,
    Subject,
    Author,
    Performer2,
    Participant2,
    Authenticator,
    AssignedCustodian,
    Custodian,
    RecordTarget,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullFlavored;

    #[test]
    fn participant_role_classifies_location_and_device() {
        let yaml = r#"
classCode: SDLOC
playingEntity:
  names:
    - text: Community Urgent Care Center
"#;
        let role: ParticipantRole = serde_yaml::from_str(yaml).expect("should parse role");
        assert!(role.is_service_delivery_location());
        assert!(!role.is_product_instance());

        let device: ParticipantRole = serde_yaml::from_str(
            "classCode: MANU\nplayingDevice:\n  code:\n    code: \"14106009\"\n",
        )
        .expect("should parse device role");
        assert!(device.is_product_instance());
    }

    #[test]
    fn null_flavored_author_is_not_present() {
        let author: Author = serde_yaml::from_str("nullFlavor: NI").expect("should parse");
        assert!(!author.is_present());
        assert!(author.assigned_author.is_none());
    }

    #[test]
    fn patient_role_parses_nested_person() {
        let yaml = r#"
ids:
  - root: 2.16.840.1.113883.19.5
    extension: "998991"
patient:
  names:
    - use: L
      given: [Isabella, Isa]
      family: [Jones]
  administrativeGenderCode:
    code: F
    codeSystem: 2.16.840.1.113883.5.1
  birthTime:
    value: "19750501"
  guardians:
    - code:
        code: GRFTH
      addrs:
        - city: Beaverton
"#;
        let role: PatientRole = serde_yaml::from_str(yaml).expect("should parse patient role");
        let person = role.patient.expect("patient person");
        assert_eq!(person.names[0].given, vec!["Isabella", "Isa"]);
        assert_eq!(person.birth_time.and_then(|t| t.value).as_deref(), Some("19750501"));
        assert_eq!(person.guardians.len(), 1);
    }
}
