//! Medications, dispenses and immunizations.

use crate::bundle::{ResourceBundle, Satellites};
use crate::context::ConversionContext;
use crate::transformer::{is_absent, mapped, status_code, ResourceTransformer};
use cda::entities::{Consumable, ManufacturedProduct};
use cda::statements::{related_indications, related_refusal_reasons, SubstanceAdministration, Supply};
use cda::{present, present_items, SxcmTs};
use fhir::datatypes::{DateTime, Timing};
use fhir::{
    DispenseDosageInstruction, Immunization, ImmunizationExplanation, Medication,
    MedicationDispense, MedicationIngredient, MedicationProduct, MedicationStatement,
    MedicationStatementDosage, Reference, ResourceKind,
};

impl ResourceTransformer {
    /// Manufactured product → Medication.
    ///
    /// The material code becomes the medication code without its translations; each
    /// translation becomes a Substance ingredient instead.
    pub fn transform_manufactured_product(
        &self,
        ctx: &mut ConversionContext,
        product: &ManufacturedProduct,
    ) -> Option<ResourceBundle> {
        if is_absent(product, "manufacturedProduct") {
            return None;
        }
        let dtt = self.data_types();
        let mut medication = Medication::new(ctx.next_id(ResourceKind::Medication));
        let mut satellites = Satellites::new();

        let code = present(product.manufactured_material.as_ref())
            .and_then(|material| present(material.code.as_ref()));
        if let Some(code) = code {
            medication.code = dtt.codeable_concept_excluding_translations(code);
            let mut ingredient = Vec::new();
            for translation in &code.translations {
                if let Some(substance) = self.transform_substance(ctx, translation) {
                    ingredient.push(MedicationIngredient {
                        item: satellites.add(substance),
                    });
                }
            }
            if !ingredient.is_empty() {
                medication.product = Some(MedicationProduct { ingredient });
            }
        }

        medication.manufacturer = product
            .manufacturer_organization
            .as_ref()
            .and_then(|org| self.transform_organization(ctx, org))
            .map(|org| satellites.add(org));

        Some(ResourceBundle::new(medication, satellites))
    }

    fn consumable_medication(
        &self,
        ctx: &mut ConversionContext,
        consumable: Option<&Consumable>,
        satellites: &mut Satellites,
    ) -> Option<Reference> {
        let product = present(consumable).and_then(|c| c.manufactured_product.as_ref())?;
        satellites.absorb(self.transform_manufactured_product(ctx, product))
    }

    /// Medication activity → MedicationStatement.
    ///
    /// Interval effective times become the effective period and periodic ones the dosage
    /// timing. An indication beneath the activity becomes the reason for use and marks the
    /// medication as taken, overriding the negation indicator.
    pub fn transform_medication_activity(
        &self,
        ctx: &mut ConversionContext,
        activity: &SubstanceAdministration,
    ) -> Option<ResourceBundle> {
        if is_absent(activity, "medicationActivity") {
            return None;
        }
        let dtt = self.data_types();
        let vst = self.value_sets();
        let mut statement = MedicationStatement::new(ctx.next_id(ResourceKind::MedicationStatement));
        let mut satellites = Satellites::new();

        statement.identifier = dtt.identifiers(&activity.ids);
        statement.patient = ctx.patient_reference();
        statement.status = status_code(activity.status_code.as_ref()).and_then(|code| {
            mapped(vst.medication_statement_status(code), code, "MedicationStatementStatus")
        });
        statement.information_source = activity
            .authors
            .first()
            .and_then(|author| satellites.absorb(self.transform_author(ctx, author)));
        statement.medication_reference =
            self.consumable_medication(ctx, activity.consumable.as_ref(), &mut satellites);

        let mut dosage = MedicationStatementDosage::default();
        for time in present_items(&activity.effective_times) {
            match time {
                SxcmTs::IvlTs(ivl) => {
                    if let Some(period) = dtt.period(ivl) {
                        statement.effective_period = Some(period);
                    }
                }
                SxcmTs::PivlTs(pivl) => {
                    if let Some(timing) = dtt.timing(pivl) {
                        dosage.timing = Some(timing);
                    }
                }
                SxcmTs::Ts(_) | SxcmTs::Unknown => {
                    tracing::debug!("skipping medication effective time without interval");
                }
            }
        }
        dosage.quantity_quantity = activity
            .dose_quantity
            .as_ref()
            .and_then(|ivl| dtt.quantity_from_interval(ivl));
        dosage.route = self.concept(activity.route_code.as_ref());
        dosage.rate_range = activity.rate_quantity.as_ref().and_then(|ivl| dtt.range(ivl));
        dosage.max_dose_per_period = activity.max_dose_quantity.as_ref().and_then(|rto| dtt.ratio(rto));
        if dosage != MedicationStatementDosage::default() {
            statement.dosage.push(dosage);
        }

        statement.was_not_taken = activity.negation_ind;
        for indication in related_indications(&activity.entry_relationships) {
            if let Some(condition) = self.transform_indication(ctx, indication) {
                statement.was_not_taken = Some(false);
                statement.reason_for_use_reference = Some(satellites.add(condition));
            }
        }

        Some(ResourceBundle::new(statement, satellites))
    }

    /// Medication dispense → MedicationDispense.
    ///
    /// The first effective time is when the dispense was prepared and the second when it was
    /// handed over. Every effective time is also an event of the dosage instruction timing.
    pub fn transform_medication_dispense(
        &self,
        ctx: &mut ConversionContext,
        supply: &Supply,
    ) -> Option<ResourceBundle> {
        if is_absent(supply, "medicationDispense") {
            return None;
        }
        let dtt = self.data_types();
        let vst = self.value_sets();
        let mut dispense = MedicationDispense::new(ctx.next_id(ResourceKind::MedicationDispense));
        let mut satellites = Satellites::new();

        dispense.identifier = dtt.identifiers(&supply.ids).pop();
        dispense.patient = ctx.patient_reference();
        dispense.status = status_code(supply.status_code.as_ref()).and_then(|code| {
            mapped(vst.medication_dispense_status(code), code, "MedicationDispenseStatus")
        });
        dispense.type_code = self.concept(supply.code.as_ref());
        dispense.medication_reference =
            self.consumable_medication(ctx, supply.product.as_ref(), &mut satellites);
        for performer in &supply.performers {
            if let Some(dispenser) = satellites.absorb(self.transform_performer(ctx, performer)) {
                dispense.dispenser = Some(dispenser);
            }
        }
        dispense.quantity = supply.quantity.as_ref().and_then(|pq| dtt.quantity(pq));

        let time_at = |index: usize| -> Option<DateTime> {
            supply
                .effective_times
                .get(index)
                .and_then(|time| present(Some(time)))
                .and_then(SxcmTs::value)
                .and_then(|value| dtt.date_time_from_text(value))
        };
        dispense.when_prepared = time_at(0);
        dispense.when_handed_over = time_at(1);

        let instruction = DispenseDosageInstruction {
            timing: Some(Timing {
                event: present_items(&supply.effective_times)
                    .filter_map(SxcmTs::value)
                    .filter_map(|value| dtt.date_time_from_text(value))
                    .collect(),
                repeat: None,
            })
            .filter(|timing| !timing.is_empty()),
            dose_quantity: dispense.quantity.clone(),
        };
        if instruction != DispenseDosageInstruction::default() {
            dispense.dosage_instruction.push(instruction);
        }

        Some(ResourceBundle::new(dispense, satellites))
    }

    /// Immunization activity → Immunization.
    ///
    /// Refusal reasons beneath the activity become `explanation.reasonNotGiven`.
    pub fn transform_immunization_activity(
        &self,
        ctx: &mut ConversionContext,
        activity: &SubstanceAdministration,
    ) -> Option<ResourceBundle> {
        if is_absent(activity, "immunizationActivity") {
            return None;
        }
        let dtt = self.data_types();
        let vst = self.value_sets();
        let mut immunization = Immunization::new(ctx.next_id(ResourceKind::Immunization));
        let mut satellites = Satellites::new();

        immunization.identifier = dtt.identifiers(&activity.ids);
        immunization.patient = ctx.patient_reference();
        immunization.date = present_items(&activity.effective_times)
            .filter_map(SxcmTs::value)
            .filter_map(|value| dtt.date_time_from_text(value))
            .last();

        let product = present(activity.consumable.as_ref())
            .and_then(|consumable| present(consumable.manufactured_product.as_ref()));
        if let Some(product) = product {
            if let Some(material) = present(product.manufactured_material.as_ref()) {
                immunization.vaccine_code = self.concept(material.code.as_ref());
                immunization.lot_number = material
                    .lot_number_text
                    .as_ref()
                    .and_then(|st| dtt.string(st));
            }
            immunization.manufacturer = product
                .manufacturer_organization
                .as_ref()
                .and_then(|org| self.transform_organization(ctx, org))
                .map(|org| satellites.add(org));
        }

        for performer in &activity.performers {
            if let Some(reference) = satellites.absorb(self.transform_performer(ctx, performer)) {
                immunization.performer = Some(reference);
            }
        }
        immunization.site = self.last_concept(&activity.approach_site_codes);
        immunization.route = self.concept(activity.route_code.as_ref());
        immunization.dose_quantity = activity
            .dose_quantity
            .as_ref()
            .and_then(|ivl| dtt.quantity_from_interval(ivl));
        immunization.status = status_code(activity.status_code.as_ref())
            .and_then(|code| mapped(vst.immunization_status(code), code, "ImmunizationStatus"));
        immunization.was_not_given = activity.negation_ind;

        let reason_not_given: Vec<_> = related_refusal_reasons(&activity.entry_relationships)
            .filter_map(|reason| self.concept(reason.code.as_ref()))
            .collect();
        if !reason_not_given.is_empty() {
            immunization.explanation = Some(ImmunizationExplanation {
                reason_not_given,
                ..Default::default()
            });
        }

        Some(ResourceBundle::new(immunization, satellites))
    }
}
