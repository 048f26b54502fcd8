//! Encounters and procedures.

use crate::bundle::{ResourceBundle, Satellites};
use crate::context::ConversionContext;
use crate::transformer::{is_absent, mapped, status_code, ResourceTransformer};
use cda::statements::{related_indications, Encounter, Procedure};
use cda::{present, present_items};
use fhir::datatypes::CodeableConcept;
use fhir::{EncounterLocation, EncounterParticipant, ProcedurePerformer, ResourceKind};

impl ResourceTransformer {
    /// Encounter → Encounter.
    ///
    /// The class comes from the translations of the encounter code, the last mapped one
    /// winning. Performers become `PRF` participants, service delivery locations become
    /// Location resources, and the coded values of related indications become reasons.
    pub fn transform_encounter(
        &self,
        ctx: &mut ConversionContext,
        encounter: &Encounter,
    ) -> Option<ResourceBundle> {
        if is_absent(encounter, "encounter") {
            return None;
        }
        let dtt = self.data_types();
        let vst = self.value_sets();
        let mut target = fhir::Encounter::new(ctx.next_id(ResourceKind::Encounter));
        let mut satellites = Satellites::new();

        target.identifier = dtt.identifiers(&encounter.ids);
        target.patient = ctx.patient_reference();
        target.status = status_code(encounter.status_code.as_ref())
            .and_then(|code| mapped(vst.encounter_status(code), code, "EncounterStatus"));

        if let Some(code) = present(encounter.code.as_ref()) {
            target.type_code.extend(dtt.codeable_concept(code));
            target.class_code = code
                .translations
                .iter()
                .filter_map(|translation| translation.code_value())
                .filter_map(|c| mapped(vst.encounter_class(c), c, "EncounterClass"))
                .last();
        }
        target.priority = self.concept(encounter.priority_code.as_ref());

        // entry performers carry no type code of their own
        let performer_type: Vec<CodeableConcept> = vst
            .participation_type("PRF")
            .map(|kind| CodeableConcept::from_coding(kind.to_coding()))
            .into_iter()
            .collect();
        for performer in &encounter.performers {
            if let Some(individual) = satellites.absorb(self.transform_performer(ctx, performer)) {
                target.participant.push(EncounterParticipant {
                    type_code: performer_type.clone(),
                    individual: Some(individual),
                });
            }
        }

        target.period = present(encounter.effective_time.as_ref()).and_then(|ivl| dtt.period(ivl));

        let locations = present_items(&encounter.participants)
            .filter(|participant| participant.is_location())
            .filter_map(|participant| present(participant.participant_role.as_ref()))
            .filter(|role| role.is_service_delivery_location());
        for role in locations {
            if let Some(location) = self.transform_location(ctx, role) {
                target.location.push(EncounterLocation {
                    location: satellites.add(location),
                });
            }
        }

        for indication in related_indications(&encounter.entry_relationships) {
            target.reason.extend(self.concepts(indication.coded_values()));
        }

        Some(ResourceBundle::new(target, satellites))
    }

    /// Encounter activity → Encounter. Identical to [`Self::transform_encounter`].
    pub fn transform_encounter_activity(
        &self,
        ctx: &mut ConversionContext,
        encounter: &Encounter,
    ) -> Option<ResourceBundle> {
        self.transform_encounter(ctx, encounter)
    }

    /// Procedure → Procedure, with one performer actor per present performer.
    pub fn transform_procedure(
        &self,
        ctx: &mut ConversionContext,
        procedure: &Procedure,
    ) -> Option<ResourceBundle> {
        if is_absent(procedure, "procedure") {
            return None;
        }
        let dtt = self.data_types();
        let vst = self.value_sets();
        let mut target = fhir::Procedure::new(ctx.next_id(ResourceKind::Procedure));
        let mut satellites = Satellites::new();

        target.identifier = dtt.identifiers(&procedure.ids);
        target.subject = ctx.patient_reference();
        target.performed_period =
            present(procedure.effective_time.as_ref()).and_then(|ivl| dtt.period(ivl));
        target.body_site = self.concepts(present_items(&procedure.target_site_codes));

        for performer in &procedure.performers {
            if let Some(actor) = satellites.absorb(self.transform_performer(ctx, performer)) {
                target.performer.push(ProcedurePerformer { actor: Some(actor) });
            }
        }

        target.status = status_code(procedure.status_code.as_ref())
            .and_then(|code| mapped(vst.procedure_status(code), code, "ProcedureStatus"));
        target.code = self.concept(procedure.code.as_ref());

        Some(ResourceBundle::new(target, satellites))
    }
}
