//! The document rule: Composition, sections and entry dispatch.

use crate::bundle::{ResourceBundle, Satellites};
use crate::context::ConversionContext;
use crate::transformer::{is_absent, ResourceTransformer};
use cda::document::{ClinicalDocument, Section};
use cda::entities::Authenticator;
use cda::statements::ClinicalStatement;
use cda::{present, present_items, Cd};
use fhir::codes::{AttestationMode, CompositionStatus};
use fhir::{Composition, CompositionAttester, CompositionSection, ResourceKind};

impl ResourceTransformer {
    /// Dispatches a section entry to the rule for its template.
    ///
    /// Templates that only occur beneath other statements, and unknown templates, yield
    /// nothing.
    pub fn transform_entry(
        &self,
        ctx: &mut ConversionContext,
        entry: &ClinicalStatement,
    ) -> Option<ResourceBundle> {
        if is_absent(entry, entry.template_name()) {
            return None;
        }
        match entry {
            ClinicalStatement::AllergyProblemAct(act) => self.transform_allergy_problem_act(ctx, act),
            ClinicalStatement::ProblemConcernAct(act) => self.transform_problem_concern_act(ctx, act),
            ClinicalStatement::Encounter(encounter) => self.transform_encounter(ctx, encounter),
            ClinicalStatement::EncounterActivity(encounter) => {
                self.transform_encounter_activity(ctx, encounter)
            }
            ClinicalStatement::Procedure(procedure) => self.transform_procedure(ctx, procedure),
            ClinicalStatement::MedicationActivity(activity) => {
                self.transform_medication_activity(ctx, activity)
            }
            ClinicalStatement::ImmunizationActivity(activity) => {
                self.transform_immunization_activity(ctx, activity)
            }
            ClinicalStatement::MedicationDispense(supply) => {
                self.transform_medication_dispense(ctx, supply)
            }
            ClinicalStatement::NonMedicinalSupplyActivity(supply) => self
                .transform_supply_device(ctx, supply)
                .map(ResourceBundle::single),
            ClinicalStatement::ResultOrganizer(organizer) => {
                self.transform_result_organizer(ctx, organizer)
            }
            ClinicalStatement::FamilyHistoryOrganizer(organizer) => {
                self.transform_family_history_organizer(ctx, organizer)
            }
            ClinicalStatement::Observation(observation) => {
                self.transform_observation(ctx, observation)
            }
            ClinicalStatement::ResultObservation(observation) => {
                self.transform_result_observation(ctx, observation)
            }
            ClinicalStatement::VitalSignObservation(observation) => {
                self.transform_vital_sign_observation(ctx, observation)
            }
            ClinicalStatement::FunctionalStatusObservation(observation) => {
                self.transform_functional_status_observation(ctx, observation)
            }
            ClinicalStatement::Indication(observation) => self
                .transform_indication(ctx, observation)
                .map(ResourceBundle::single),
            ClinicalStatement::ProblemObservation(_)
            | ClinicalStatement::AllergyObservation(_)
            | ClinicalStatement::ReactionObservation(_)
            | ClinicalStatement::SeverityObservation(_)
            | ClinicalStatement::AgeObservation(_)
            | ClinicalStatement::FamilyHistoryObservation(_)
            | ClinicalStatement::FamilyHistoryDeathObservation(_)
            | ClinicalStatement::ImmunizationRefusalReason(_)
            | ClinicalStatement::Unknown => {
                tracing::debug!(
                    template = entry.template_name(),
                    "no section-level rule for entry"
                );
                None
            }
        }
    }

    /// Section → Composition section.
    ///
    /// Entry bundles are merged into `satellites`; the section lists a reference to each
    /// entry's primary. Nested sections are converted the same way.
    pub fn transform_section(
        &self,
        ctx: &mut ConversionContext,
        section: &Section,
        satellites: &mut Satellites,
    ) -> Option<CompositionSection> {
        if is_absent(section, "section") {
            return None;
        }
        let dtt = self.data_types();
        let mut target = CompositionSection {
            title: section.title.as_ref().and_then(|st| dtt.string(st)),
            code: self.concept(section.code.as_ref()),
            text: section.text.as_ref().and_then(|text| dtt.narrative(text)),
            ..Default::default()
        };
        for entry in &section.entries {
            if let Some(reference) = satellites.absorb(self.transform_entry(ctx, entry)) {
                target.entry.push(reference);
            }
        }
        for nested in &section.sections {
            if let Some(nested) = self.transform_section(ctx, nested, satellites) {
                target.section.push(nested);
            }
        }
        Some(target)
    }

    /// Clinical document → Composition, with every resource of the document as satellites.
    ///
    /// The patient of the first present record target is converted before anything else that
    /// refers to it, and becomes the patient reference of the context. Without one, the
    /// composition subject and every patient reference stay unset.
    pub fn transform_clinical_document(
        &self,
        ctx: &mut ConversionContext,
        document: &ClinicalDocument,
    ) -> Option<ResourceBundle> {
        if is_absent(document, "clinicalDocument") {
            return None;
        }
        let dtt = self.data_types();
        let mut composition = Composition::new(ctx.next_id(ResourceKind::Composition));
        let mut satellites = Satellites::new();

        composition.identifier = document.id.as_ref().and_then(|ii| dtt.identifier(ii));
        composition.date = document.effective_time.as_ref().and_then(|ts| dtt.date_time(ts));
        composition.type_code = self.concept(document.code.as_ref());
        composition.title = document.title.as_ref().and_then(|st| dtt.string(st));
        composition.status = Some(CompositionStatus::Final);
        composition.confidentiality = document
            .confidentiality_code
            .as_ref()
            .and_then(Cd::code_value)
            .map(str::to_owned);

        let patient = present_items(&document.record_targets)
            .find_map(|target| present(target.patient_role.as_ref()))
            .and_then(|role| self.transform_patient_role(ctx, role));
        match patient {
            Some(patient) => {
                ctx.set_patient(patient.primary_id());
                composition.subject = Some(satellites.merge(patient));
            }
            None => tracing::warn!("document has no record target; composition subject left unset"),
        }

        for author in &document.authors {
            if let Some(reference) = satellites.absorb(self.transform_author(ctx, author)) {
                composition.author.push(reference);
            }
        }

        let attesters = document
            .legal_authenticator
            .iter()
            .map(|authenticator| (AttestationMode::Legal, authenticator))
            .chain(
                document
                    .authenticators
                    .iter()
                    .map(|authenticator| (AttestationMode::Professional, authenticator)),
            );
        for (mode, authenticator) in attesters {
            if let Some(attester) = self.attester(ctx, mode, authenticator, &mut satellites) {
                composition.attester.push(attester);
            }
        }

        composition.custodian = present(document.custodian.as_ref())
            .and_then(|custodian| present(custodian.assigned_custodian.as_ref()))
            .and_then(|assigned| assigned.represented_custodian_organization.as_ref())
            .and_then(|org| self.transform_custodian_organization(ctx, org))
            .map(|org| satellites.add(org));

        for section in &document.sections {
            if let Some(section) = self.transform_section(ctx, section, &mut satellites) {
                composition.section.push(section);
            }
        }

        Some(ResourceBundle::new(composition, satellites))
    }

    fn attester(
        &self,
        ctx: &mut ConversionContext,
        mode: AttestationMode,
        authenticator: &Authenticator,
        satellites: &mut Satellites,
    ) -> Option<CompositionAttester> {
        if is_absent(authenticator, "authenticator") {
            return None;
        }
        let time = authenticator
            .time
            .as_ref()
            .and_then(|ts| self.data_types().date_time(ts));
        let party = authenticator
            .assigned_entity
            .as_ref()
            .and_then(|entity| satellites.absorb(self.transform_assigned_entity(ctx, entity)));
        if time.is_none() && party.is_none() {
            return None;
        }
        Some(CompositionAttester {
            mode: vec![mode],
            time,
            party,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use cda::entities::{
        AssignedAuthor, AssignedCustodian, AssignedEntity, Author, Custodian,
        CustodianOrganization, PatientRole, RecordTarget,
    };
    use cda::statements::{Act, Encounter};
    use cda::{Ii, NullFlavor, On, St, StrucDocText, Ts};
    use cda2fhir_uuid::IdStrategy;
    use fhir::Resource;

    fn transformer() -> ResourceTransformer {
        ResourceTransformer::default()
    }

    fn document_context() -> ConversionContext {
        let config = CoreConfig::new(IdStrategy::Counter, "0").expect("config");
        ConversionContext::for_document(&config)
    }

    fn st(text: &str) -> St {
        St {
            text: Some(text.into()),
            null_flavor: None,
        }
    }

    fn encounters_section() -> Section {
        Section {
            code: Some(Cd {
                code: Some("46240-8".into()),
                code_system: Some("2.16.840.1.113883.6.1".into()),
                ..Default::default()
            }),
            title: Some(st("ENCOUNTERS")),
            text: Some(StrucDocText("<table/>".into())),
            entries: vec![
                ClinicalStatement::EncounterActivity(Encounter::default()),
                ClinicalStatement::Unknown,
                ClinicalStatement::AllergyProblemAct(Act {
                    null_flavor: Some(NullFlavor::Ni),
                    ..Default::default()
                }),
            ],
            ..Default::default()
        }
    }

    fn document() -> ClinicalDocument {
        ClinicalDocument {
            id: Some(Ii {
                root: Some("2.16.840.1.113883.19.5.99999.1".into()),
                extension: Some("TT988".into()),
                ..Default::default()
            }),
            title: Some(st("Continuity of Care Document")),
            effective_time: Some(Ts::new("20120815")),
            confidentiality_code: Some(Cd {
                code: Some("N".into()),
                ..Default::default()
            }),
            record_targets: vec![RecordTarget {
                patient_role: Some(PatientRole::default()),
                null_flavor: None,
            }],
            authors: vec![Author {
                assigned_author: Some(AssignedAuthor::default()),
                ..Default::default()
            }],
            legal_authenticator: Some(Authenticator {
                time: Some(Ts::new("20120815")),
                assigned_entity: Some(AssignedEntity::default()),
                ..Default::default()
            }),
            custodian: Some(Custodian {
                assigned_custodian: Some(AssignedCustodian {
                    represented_custodian_organization: Some(CustodianOrganization {
                        name: Some(On {
                            text: Some("Community Health and Hospitals".into()),
                            null_flavor: None,
                        }),
                        ..Default::default()
                    }),
                    null_flavor: None,
                }),
                null_flavor: None,
            }),
            sections: vec![Section {
                sections: vec![encounters_section()],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn composition_is_allocated_first_and_patient_second() {
        let mut ctx = document_context();
        let bundle = transformer()
            .transform_clinical_document(&mut ctx, &document())
            .expect("document bundle");
        let Resource::Composition(composition) = bundle.primary() else {
            panic!("expected Composition primary");
        };
        assert_eq!(composition.id().to_string(), "Composition/1");
        let subject = composition.subject.as_ref().expect("subject");
        assert_eq!(subject.target().to_string(), "Patient/2");
        assert_eq!(ctx.patient_reference().as_ref(), Some(subject));
        assert_eq!(composition.confidentiality.as_deref(), Some("N"));
        assert_eq!(composition.status, Some(CompositionStatus::Final));
    }

    #[test]
    fn header_participants_are_wired() {
        let mut ctx = document_context();
        let bundle = transformer()
            .transform_clinical_document(&mut ctx, &document())
            .expect("document bundle");
        let Resource::Composition(composition) = bundle.primary() else {
            panic!("expected Composition primary");
        };
        assert_eq!(composition.author.len(), 1);
        assert_eq!(composition.attester.len(), 1);
        let attester = &composition.attester[0];
        assert_eq!(attester.mode, vec![AttestationMode::Legal]);
        assert!(attester.time.is_some());
        let party = attester.party.as_ref().expect("party");
        assert!(matches!(bundle.get(party.target()), Some(Resource::Practitioner(_))));
        let custodian = composition.custodian.as_ref().expect("custodian");
        assert!(matches!(
            bundle.get(custodian.target()),
            Some(Resource::Organization(_))
        ));
    }

    #[test]
    fn nested_section_entries_are_referenced() {
        let mut ctx = document_context();
        let bundle = transformer()
            .transform_clinical_document(&mut ctx, &document())
            .expect("document bundle");
        let Resource::Composition(composition) = bundle.primary() else {
            panic!("expected Composition primary");
        };
        let nested = &composition.section[0].section[0];
        assert_eq!(nested.title.as_deref(), Some("ENCOUNTERS"));
        assert!(nested.text.is_some());
        assert_eq!(nested.entry.len(), 1);
        match bundle.get(nested.entry[0].target()) {
            Some(Resource::Encounter(encounter)) => {
                assert_eq!(encounter.patient, ctx.patient_reference());
            }
            other => panic!("expected Encounter entry, got {other:?}"),
        }
    }

    #[test]
    fn missing_record_target_leaves_patient_references_unset() {
        let mut ctx = document_context();
        let mut document = document();
        document.record_targets[0].null_flavor = Some(NullFlavor::Unk);
        let bundle = transformer()
            .transform_clinical_document(&mut ctx, &document)
            .expect("document bundle");
        let Resource::Composition(composition) = bundle.primary() else {
            panic!("expected Composition primary");
        };
        assert!(composition.subject.is_none());
        assert!(ctx.patient_reference().is_none());
        assert!(!bundle
            .entries()
            .iter()
            .any(|resource| matches!(resource, Resource::Patient(_))));
        let encounter = bundle
            .entries()
            .iter()
            .find_map(|resource| match resource {
                Resource::Encounter(encounter) => Some(encounter),
                _ => None,
            })
            .expect("encounter");
        assert!(encounter.patient.is_none());
    }

    #[test]
    fn absent_document_yields_nothing() {
        let mut ctx = document_context();
        let document = ClinicalDocument {
            null_flavor: Some(NullFlavor::Msk),
            ..document()
        };
        assert!(transformer()
            .transform_clinical_document(&mut ctx, &document)
            .is_none());
        assert_eq!(ctx.issued(), 0);
    }
}
