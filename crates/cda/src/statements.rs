//! C-CDA clinical statements.
//!
//! The CDA R2 clinical statement classes (observation, act, encounter, procedure, substance
//! administration, supply, organizer) are specialised by C-CDA templates. A converter needs to
//! know which template an element conforms to, so statements are deserialized into
//! [`ClinicalStatement`], an internally tagged enum keyed by `type`:
//!
//! ```yaml
//! type: AllergyProblemAct
//! ids:
//!   - root: 36e3e930-7b14-11db-9fe1-0800200c9a66
//! statusCode:
//!   code: active
//! entryRelationships:
//!   - typeCode: SUBJ
//!     statement:
//!       type: AllergyObservation
//!       ...
//! ```
//!
//! Section entries, entry relationship targets and organizer components all use the same enum,
//! so a rule matches the variants it understands and skips the rest.

use crate::datatypes::{AnyValue, Cd, Ed, Ii, IvlPq, IvlTs, NullFlavor, Pq, Rto, SxcmTs};
use crate::entities::{Author, Consumable, Participant2, Performer2, Subject};
use crate::{present, present_items, NullFlavored};
use serde::Deserialize;

// ============================================================================
// Statement shapes
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Observation {
    pub ids: Vec<Ii>,
    pub code: Option<Cd>,
    pub status_code: Option<Cd>,
    pub effective_time: Option<IvlTs>,
    pub negation_ind: Option<bool>,
    pub values: Vec<AnyValue>,
    pub interpretation_codes: Vec<Cd>,
    pub method_codes: Vec<Cd>,
    pub target_site_codes: Vec<Cd>,
    pub authors: Vec<Author>,
    pub participants: Vec<Participant2>,
    pub entry_relationships: Vec<EntryRelationship>,
    pub reference_ranges: Vec<ReferenceRange>,
    pub null_flavor: Option<NullFlavor>,
}

impl Observation {
    /// Present coded values, in document order.
    pub fn coded_values(&self) -> impl Iterator<Item = &Cd> {
        present_items(&self.values).filter_map(AnyValue::as_cd)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Act {
    pub ids: Vec<Ii>,
    pub code: Option<Cd>,
    pub status_code: Option<Cd>,
    pub effective_time: Option<IvlTs>,
    pub authors: Vec<Author>,
    pub entry_relationships: Vec<EntryRelationship>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Encounter {
    pub ids: Vec<Ii>,
    pub code: Option<Cd>,
    pub status_code: Option<Cd>,
    pub effective_time: Option<IvlTs>,
    pub priority_code: Option<Cd>,
    pub performers: Vec<Performer2>,
    pub participants: Vec<Participant2>,
    pub entry_relationships: Vec<EntryRelationship>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Procedure {
    pub ids: Vec<Ii>,
    pub code: Option<Cd>,
    pub status_code: Option<Cd>,
    pub effective_time: Option<IvlTs>,
    pub target_site_codes: Vec<Cd>,
    pub performers: Vec<Performer2>,
    pub entry_relationships: Vec<EntryRelationship>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubstanceAdministration {
    pub ids: Vec<Ii>,
    pub code: Option<Cd>,
    pub status_code: Option<Cd>,
    pub negation_ind: Option<bool>,
    pub effective_times: Vec<SxcmTs>,
    pub route_code: Option<Cd>,
    pub approach_site_codes: Vec<Cd>,
    pub dose_quantity: Option<IvlPq>,
    pub rate_quantity: Option<IvlPq>,
    pub max_dose_quantity: Option<Rto>,
    pub consumable: Option<Consumable>,
    pub authors: Vec<Author>,
    pub performers: Vec<Performer2>,
    pub entry_relationships: Vec<EntryRelationship>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Supply {
    pub ids: Vec<Ii>,
    pub code: Option<Cd>,
    pub status_code: Option<Cd>,
    pub effective_times: Vec<SxcmTs>,
    pub quantity: Option<Pq>,
    pub product: Option<Consumable>,
    pub performers: Vec<Performer2>,
    pub participants: Vec<Participant2>,
    pub entry_relationships: Vec<EntryRelationship>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Organizer {
    pub ids: Vec<Ii>,
    pub code: Option<Cd>,
    pub status_code: Option<Cd>,
    pub effective_time: Option<IvlTs>,
    pub authors: Vec<Author>,
    pub subject: Option<Subject>,
    pub components: Vec<ClinicalStatement>,
    pub null_flavor: Option<NullFlavor>,
}

// ============================================================================
// Relationships
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntryRelationship {
    /// `x_ActRelationshipEntryRelationship` code (`SUBJ`, `RSON`, `MFST`, `REFR`, ...).
    pub type_code: Option<String>,
    pub inversion_ind: Option<bool>,
    pub statement: Option<ClinicalStatement>,
    pub null_flavor: Option<NullFlavor>,
}

/// `observationRange` of a reference range.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObservationRange {
    pub value: Option<AnyValue>,
    pub interpretation_code: Option<Cd>,
    pub text: Option<Ed>,
    pub null_flavor: Option<NullFlavor>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceRange {
    pub observation_range: Option<ObservationRange>,
    pub null_flavor: Option<NullFlavor>,
}

// ============================================================================
// Template dispatch
// ============================================================================

/// A clinical statement identified by its C-CDA template.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ClinicalStatement {
    /// Observation without a more specific template.
    Observation(Observation),
    ProblemObservation(Observation),
    AllergyObservation(Observation),
    ReactionObservation(Observation),
    SeverityObservation(Observation),
    Indication(Observation),
    AgeObservation(Observation),
    FamilyHistoryObservation(Observation),
    FamilyHistoryDeathObservation(Observation),
    ResultObservation(Observation),
    VitalSignObservation(Observation),
    /// Functional status and self-care observations.
    FunctionalStatusObservation(Observation),
    ImmunizationRefusalReason(Observation),
    AllergyProblemAct(Act),
    ProblemConcernAct(Act),
    Encounter(Encounter),
    EncounterActivity(Encounter),
    Procedure(Procedure),
    MedicationActivity(SubstanceAdministration),
    ImmunizationActivity(SubstanceAdministration),
    MedicationDispense(Supply),
    NonMedicinalSupplyActivity(Supply),
    ResultOrganizer(Organizer),
    FamilyHistoryOrganizer(Organizer),
    /// A template this model does not describe.
    #[serde(other)]
    Unknown,
}

impl ClinicalStatement {
    /// Short name of the template, for logging.
    pub fn template_name(&self) -> &'static str {
        match self {
            ClinicalStatement::Observation(_) => "Observation",
            ClinicalStatement::ProblemObservation(_) => "ProblemObservation",
            ClinicalStatement::AllergyObservation(_) => "AllergyObservation",
            ClinicalStatement::ReactionObservation(_) => "ReactionObservation",
            ClinicalStatement::SeverityObservation(_) => "SeverityObservation",
            ClinicalStatement::Indication(_) => "Indication",
            ClinicalStatement::AgeObservation(_) => "AgeObservation",
            ClinicalStatement::FamilyHistoryObservation(_) => "FamilyHistoryObservation",
            ClinicalStatement::FamilyHistoryDeathObservation(_) => "FamilyHistoryDeathObservation",
            ClinicalStatement::ResultObservation(_) => "ResultObservation",
            ClinicalStatement::VitalSignObservation(_) => "VitalSignObservation",
            ClinicalStatement::FunctionalStatusObservation(_) => "FunctionalStatusObservation",
            ClinicalStatement::ImmunizationRefusalReason(_) => "ImmunizationRefusalReason",
            ClinicalStatement::AllergyProblemAct(_) => "AllergyProblemAct",
            ClinicalStatement::ProblemConcernAct(_) => "ProblemConcernAct",
            ClinicalStatement::Encounter(_) => "Encounter",
            ClinicalStatement::EncounterActivity(_) => "EncounterActivity",
            ClinicalStatement::Procedure(_) => "Procedure",
            ClinicalStatement::MedicationActivity(_) => "MedicationActivity",
            ClinicalStatement::ImmunizationActivity(_) => "ImmunizationActivity",
            ClinicalStatement::MedicationDispense(_) => "MedicationDispense",
            ClinicalStatement::NonMedicinalSupplyActivity(_) => "NonMedicinalSupplyActivity",
            ClinicalStatement::ResultOrganizer(_) => "ResultOrganizer",
            ClinicalStatement::FamilyHistoryOrganizer(_) => "FamilyHistoryOrganizer",
            ClinicalStatement::Unknown => "Unknown",
        }
    }
}

impl NullFlavored for ClinicalStatement {
    fn null_flavor(&self) -> Option<NullFlavor> {
        match self {
            ClinicalStatement::Observation(s)
            | ClinicalStatement::ProblemObservation(s)
            | ClinicalStatement::AllergyObservation(s)
            | ClinicalStatement::ReactionObservation(s)
            | ClinicalStatement::SeverityObservation(s)
            | ClinicalStatement::Indication(s)
            | ClinicalStatement::AgeObservation(s)
            | ClinicalStatement::FamilyHistoryObservation(s)
            | ClinicalStatement::FamilyHistoryDeathObservation(s)
            | ClinicalStatement::ResultObservation(s)
            | ClinicalStatement::VitalSignObservation(s)
            | ClinicalStatement::FunctionalStatusObservation(s)
            | ClinicalStatement::ImmunizationRefusalReason(s) => s.null_flavor,
            ClinicalStatement::AllergyProblemAct(s) | ClinicalStatement::ProblemConcernAct(s) => {
                s.null_flavor
            }
            ClinicalStatement::Encounter(s) | ClinicalStatement::EncounterActivity(s) => {
                s.null_flavor
            }
            ClinicalStatement::Procedure(s) => s.null_flavor,
            ClinicalStatement::MedicationActivity(s) | ClinicalStatement::ImmunizationActivity(s) => {
                s.null_flavor
            }
            ClinicalStatement::MedicationDispense(s)
            | ClinicalStatement::NonMedicinalSupplyActivity(s) => s.null_flavor,
            ClinicalStatement::ResultOrganizer(s) | ClinicalStatement::FamilyHistoryOrganizer(s) => {
                s.null_flavor
            }
            ClinicalStatement::Unknown => None,
        }
    }
}

/// Present statements reachable through present entry relationships.
pub fn related_statements(
    relationships: &[EntryRelationship],
) -> impl Iterator<Item = &ClinicalStatement> {
    present_items(relationships).filter_map(|rel| present(rel.statement.as_ref()))
}

/// Generates an accessor that yields the related statements of one template.
macro_rules! related_of {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(relationships: &[EntryRelationship]) -> impl Iterator<Item = &$ty> {
            related_statements(relationships).filter_map(|statement| match statement {
                ClinicalStatement::$variant(inner) => Some(inner),
                _ => None,
            })
        }
    };
}

related_of!(related_problem_observations, ProblemObservation, Observation);
related_of!(related_allergy_observations, AllergyObservation, Observation);
related_of!(related_reaction_observations, ReactionObservation, Observation);
related_of!(related_severity_observations, SeverityObservation, Observation);
related_of!(related_indications, Indication, Observation);
related_of!(related_age_observations, AgeObservation, Observation);
related_of!(related_death_observations, FamilyHistoryDeathObservation, Observation);
related_of!(related_refusal_reasons, ImmunizationRefusalReason, Observation);
related_of!(related_non_medicinal_supplies, NonMedicinalSupplyActivity, Supply);

/// Encounters related to a statement, whichever encounter template they use.
pub fn related_encounters(relationships: &[EntryRelationship]) -> impl Iterator<Item = &Encounter> {
    related_statements(relationships).filter_map(|statement| match statement {
        ClinicalStatement::Encounter(inner) | ClinicalStatement::EncounterActivity(inner) => {
            Some(inner)
        }
        _ => None,
    })
}

crate::impl_null_flavored!(
    Observation,
    Act,
    Encounter,
    Procedure,
    SubstanceAdministration,
    Supply,
    Organizer,
    EntryRelationship,
    ObservationRange,
    ReferenceRange,
);

#[cfg(test)]
mod tests {
    use super::*;

    const ALLERGY_ACT: &str = r#"
type: AllergyProblemAct
ids:
  - root: 36e3e930-7b14-11db-9fe1-0800200c9a66
statusCode:
  code: active
effectiveTime:
  low:
    value: "20071003"
entryRelationships:
  - typeCode: SUBJ
    statement:
      type: AllergyObservation
      values:
        - type: CD
          code: "419511003"
      entryRelationships:
        - typeCode: MFST
          statement:
            type: ReactionObservation
            values:
              - type: CD
                code: "422587007"
        - typeCode: MFST
          nullFlavor: NI
          statement:
            type: ReactionObservation
  - typeCode: REFR
    statement:
      type: SomethingElse
      code:
        code: "1"
"#;

    #[test]
    fn parses_allergy_act_with_nested_relationships() {
        let statement: ClinicalStatement =
            serde_yaml::from_str(ALLERGY_ACT).expect("should parse allergy act");

        let act = match &statement {
            ClinicalStatement::AllergyProblemAct(act) => act,
            other => panic!("expected AllergyProblemAct, got {}", other.template_name()),
        };

        let allergy_obs: Vec<_> = related_allergy_observations(&act.entry_relationships).collect();
        assert_eq!(allergy_obs.len(), 1);
        assert_eq!(allergy_obs[0].coded_values().count(), 1);

        // The null-flavored relationship is skipped.
        let reactions: Vec<_> =
            related_reaction_observations(&allergy_obs[0].entry_relationships).collect();
        assert_eq!(reactions.len(), 1);
    }

    #[test]
    fn unknown_template_deserializes_to_unknown() {
        let statement: ClinicalStatement = serde_yaml::from_str(ALLERGY_ACT).expect("parse");
        let ClinicalStatement::AllergyProblemAct(act) = statement else {
            panic!("expected AllergyProblemAct");
        };
        let last = act.entry_relationships[1]
            .statement
            .as_ref()
            .expect("statement");
        assert_eq!(last, &ClinicalStatement::Unknown);
    }

    #[test]
    fn related_encounters_accepts_both_encounter_templates() {
        let yaml = r#"
- statement:
    type: Encounter
    ids: [{ root: "1.2.3" }]
- statement:
    type: EncounterActivity
- statement:
    type: Encounter
    nullFlavor: UNK
"#;
        let relationships: Vec<EntryRelationship> = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(related_encounters(&relationships).count(), 2);
    }
}
