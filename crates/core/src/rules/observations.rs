//! Observations, results and vital signs.

use crate::bundle::{ResourceBundle, Satellites};
use crate::context::ConversionContext;
use crate::transformer::{is_absent, mapped, status_code, ResourceTransformer};
use cda::statements::{
    related_encounters, related_non_medicinal_supplies, ClinicalStatement, Observation, Organizer,
    ReferenceRange,
};
use cda::{present, present_items, AnyValue, NullFlavored};
use fhir::datatypes::CodeableConcept;
use fhir::{DiagnosticReport, ObservationReferenceRange, ObservationValue, ResourceKind};

impl ResourceTransformer {
    /// Observation → Observation.
    ///
    /// Each value is dispatched on its type. A null-flavored value adds a coding to the data
    /// absent reason instead. Values and the other singular fields follow last-write-wins.
    pub fn transform_observation(
        &self,
        ctx: &mut ConversionContext,
        observation: &Observation,
    ) -> Option<ResourceBundle> {
        if is_absent(observation, "observation") {
            return None;
        }
        let dtt = self.data_types();
        let vst = self.value_sets();
        let mut target = fhir::Observation::new(ctx.next_id(ResourceKind::Observation));
        let mut satellites = Satellites::new();

        target.subject = ctx.patient_reference();
        target.identifier = dtt.identifiers(&observation.ids);
        target.code = self.concept(observation.code.as_ref());
        target.status = status_code(observation.status_code.as_ref())
            .and_then(|code| mapped(vst.observation_status(code), code, "ObservationStatus"));
        target.effective_period =
            present(observation.effective_time.as_ref()).and_then(|ivl| dtt.period(ivl));
        target.body_site = self.last_concept(&observation.target_site_codes);

        for value in &observation.values {
            match value.null_flavor() {
                Some(null_flavor) => {
                    if let Some(reason) = vst.data_absent_reason(null_flavor) {
                        let coding = reason.to_coding();
                        match target.data_absent_reason.as_mut() {
                            Some(concept) => concept.coding.push(coding),
                            None => {
                                target.data_absent_reason =
                                    Some(CodeableConcept::from_coding(coding));
                            }
                        }
                    }
                }
                None => {
                    if let Some(converted) = self.observation_value(value) {
                        target.value = Some(converted);
                    }
                }
            }
        }

        for encounter in related_encounters(&observation.entry_relationships) {
            if let Some(reference) = satellites.absorb(self.transform_encounter(ctx, encounter)) {
                target.encounter = Some(reference);
            }
        }

        for author in present_items(&observation.authors) {
            if let Some(performer) = satellites.absorb(self.transform_author(ctx, author)) {
                target.performer.push(performer);
            }
            if let Some(issued) = author.time.as_ref().and_then(|ts| dtt.instant(ts)) {
                target.issued = Some(issued);
            }
        }

        target.method = self.last_concept(&observation.method_codes);
        target.interpretation = self.last_concept(&observation.interpretation_codes);
        target.reference_range = observation
            .reference_ranges
            .iter()
            .filter_map(|range| self.transform_reference_range(range))
            .collect();

        Some(ResourceBundle::new(target, satellites))
    }

    /// Result observation → Observation.
    pub fn transform_result_observation(
        &self,
        ctx: &mut ConversionContext,
        observation: &Observation,
    ) -> Option<ResourceBundle> {
        self.transform_observation(ctx, observation)
    }

    /// Vital sign observation → Observation.
    pub fn transform_vital_sign_observation(
        &self,
        ctx: &mut ConversionContext,
        observation: &Observation,
    ) -> Option<ResourceBundle> {
        self.transform_observation(ctx, observation)
    }

    fn observation_value(&self, value: &AnyValue) -> Option<ObservationValue> {
        let dtt = self.data_types();
        match value {
            AnyValue::Cd(cd) => dtt.codeable_concept(cd).map(ObservationValue::CodeableConcept),
            AnyValue::Pq(pq) => dtt.quantity(pq).map(ObservationValue::Quantity),
            AnyValue::St(st) => dtt.string(st).map(ObservationValue::String),
            AnyValue::IvlPq(ivl) => dtt.range(ivl).map(ObservationValue::Range),
            AnyValue::Rto(rto) => dtt.ratio(rto).map(ObservationValue::Ratio),
            AnyValue::Ed(ed) => dtt.attachment(ed).map(ObservationValue::Attachment),
            AnyValue::Ts(ts) => dtt.date_time(ts).map(ObservationValue::DateTime),
            AnyValue::Unknown => {
                tracing::debug!("skipping observation value of unsupported type");
                None
            }
        }
    }

    /// Functional status observation → Observation.
    ///
    /// The observation code is the category and the coded value the code. A non-medicinal
    /// supply beneath it names the assistive device.
    pub fn transform_functional_status_observation(
        &self,
        ctx: &mut ConversionContext,
        observation: &Observation,
    ) -> Option<ResourceBundle> {
        if is_absent(observation, "functionalStatusObservation") {
            return None;
        }
        let dtt = self.data_types();
        let vst = self.value_sets();
        let mut target = fhir::Observation::new(ctx.next_id(ResourceKind::Observation));
        let mut satellites = Satellites::new();

        target.subject = ctx.patient_reference();
        target.identifier = dtt.identifiers(&observation.ids);
        target.status = status_code(observation.status_code.as_ref())
            .and_then(|code| mapped(vst.observation_status(code), code, "ObservationStatus"));
        target.category = self.concept(observation.code.as_ref());
        target.code = self.last_concept(observation.coded_values());
        for author in &observation.authors {
            if let Some(performer) = satellites.absorb(self.transform_author(ctx, author)) {
                target.performer.push(performer);
            }
        }
        target.effective_period =
            present(observation.effective_time.as_ref()).and_then(|ivl| dtt.period(ivl));

        for supply in related_non_medicinal_supplies(&observation.entry_relationships) {
            if let Some(device) = self.transform_supply_device(ctx, supply) {
                target.device = Some(satellites.add(device));
            }
        }

        Some(ResourceBundle::new(target, satellites))
    }

    /// Reference range → `Observation.referenceRange`.
    ///
    /// Bounds come from an `IVL_PQ` value. A range with nothing convertible yields nothing.
    pub fn transform_reference_range(
        &self,
        range: &ReferenceRange,
    ) -> Option<ObservationReferenceRange> {
        if is_absent(range, "referenceRange") {
            return None;
        }
        let source = present(range.observation_range.as_ref())?;
        let dtt = self.data_types();
        let mut target = ObservationReferenceRange::default();
        if let Some(bounds) = present(source.value.as_ref()).and_then(AnyValue::as_ivl_pq) {
            target.low = bounds.low.as_ref().and_then(|pq| dtt.quantity(pq));
            target.high = bounds.high.as_ref().and_then(|pq| dtt.quantity(pq));
        }
        target.meaning = self.concept(source.interpretation_code.as_ref());
        target.text = present(source.text.as_ref())
            .and_then(|ed| ed.text.as_deref())
            .filter(|text| !text.is_empty())
            .map(str::to_owned);
        Some(target).filter(|range| !range.is_empty())
    }

    /// Result organizer → DiagnosticReport.
    ///
    /// Each observation component becomes a result. Components of other templates are skipped.
    pub fn transform_result_organizer(
        &self,
        ctx: &mut ConversionContext,
        organizer: &Organizer,
    ) -> Option<ResourceBundle> {
        if is_absent(organizer, "resultOrganizer") {
            return None;
        }
        let dtt = self.data_types();
        let vst = self.value_sets();
        let mut report = DiagnosticReport::new(ctx.next_id(ResourceKind::DiagnosticReport));
        let mut satellites = Satellites::new();

        report.subject = ctx.patient_reference();
        report.identifier = dtt.identifiers(&organizer.ids);
        report.code = self.concept(organizer.code.as_ref());
        report.effective_period =
            present(organizer.effective_time.as_ref()).and_then(|ivl| dtt.period(ivl));
        report.status = status_code(organizer.status_code.as_ref()).and_then(|code| {
            mapped(vst.diagnostic_report_status(code), code, "DiagnosticReportStatus")
        });

        for author in present_items(&organizer.authors) {
            if let Some(issued) = author.time.as_ref().and_then(|ts| dtt.instant(ts)) {
                report.issued = Some(issued);
            }
            if let Some(performer) = satellites.absorb(self.transform_author(ctx, author)) {
                report.performer = Some(performer);
            }
        }

        for component in &organizer.components {
            let observation = match component {
                ClinicalStatement::ResultObservation(observation)
                | ClinicalStatement::Observation(observation)
                | ClinicalStatement::VitalSignObservation(observation) => observation,
                other => {
                    tracing::debug!(
                        template = other.template_name(),
                        "skipping result organizer component"
                    );
                    continue;
                }
            };
            match satellites.absorb(self.transform_observation(ctx, observation)) {
                Some(result) => report.result.push(result),
                None => tracing::warn!("result organizer component produced no observation"),
            }
        }

        Some(ResourceBundle::new(report, satellites))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cda::entities::{AssignedAuthor, Author, Participant2, ParticipantRole, PlayingDevice};
    use cda::statements::{EntryRelationship, ObservationRange, Supply};
    use cda::{Cd, Ed, IvlPq, NullFlavor, Pq, Ts};
    use fhir::codes::{DiagnosticReportStatus, ObservationStatus};
    use fhir::Resource;

    fn transformer() -> ResourceTransformer {
        ResourceTransformer::default()
    }

    fn cd(code: &str) -> Cd {
        Cd {
            code: Some(code.into()),
            code_system: Some("2.16.840.1.113883.6.1".into()),
            ..Default::default()
        }
    }

    fn pq(value: f64, unit: &str) -> Pq {
        Pq {
            value: Some(value),
            unit: Some(unit.into()),
            null_flavor: None,
        }
    }

    fn hemoglobin() -> Observation {
        Observation {
            code: Some(cd("30313-1")),
            status_code: Some(Cd {
                code: Some("completed".into()),
                ..Default::default()
            }),
            values: vec![AnyValue::Pq(pq(13.2, "g/dL"))],
            interpretation_codes: vec![Cd {
                code: Some("N".into()),
                ..Default::default()
            }],
            reference_ranges: vec![ReferenceRange {
                observation_range: Some(ObservationRange {
                    value: Some(AnyValue::IvlPq(IvlPq {
                        low: Some(pq(12.0, "g/dL")),
                        high: Some(pq(15.5, "g/dL")),
                        ..Default::default()
                    })),
                    ..Default::default()
                }),
                null_flavor: None,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn quantity_value_and_reference_range_are_converted() {
        let mut ctx = ConversionContext::standalone();
        let bundle = transformer()
            .transform_result_observation(&mut ctx, &hemoglobin())
            .expect("observation bundle");
        let Resource::Observation(observation) = bundle.primary() else {
            panic!("expected Observation primary");
        };
        match &observation.value {
            Some(ObservationValue::Quantity(quantity)) => {
                assert_eq!(quantity.value, Some(13.2));
                assert_eq!(quantity.unit.as_deref(), Some("g/dL"));
            }
            other => panic!("expected quantity value, got {other:?}"),
        }
        assert_eq!(observation.status, Some(ObservationStatus::Final));
        assert_eq!(observation.reference_range.len(), 1);
        let range = &observation.reference_range[0];
        assert_eq!(range.low.as_ref().and_then(|q| q.value), Some(12.0));
        assert_eq!(range.high.as_ref().and_then(|q| q.value), Some(15.5));
        assert!(observation.data_absent_reason.is_none());
    }

    #[test]
    fn null_flavored_value_records_data_absent_reason() {
        let mut ctx = ConversionContext::standalone();
        let observation = Observation {
            values: vec![AnyValue::Pq(Pq {
                null_flavor: Some(NullFlavor::Asku),
                ..Default::default()
            })],
            ..Default::default()
        };
        let bundle = transformer()
            .transform_vital_sign_observation(&mut ctx, &observation)
            .expect("observation bundle");
        let Resource::Observation(target) = bundle.primary() else {
            panic!("expected Observation primary");
        };
        assert!(target.value.is_none());
        assert_eq!(
            target.data_absent_reason.as_ref().and_then(|r| r.first_code()),
            Some("asked")
        );
    }

    #[test]
    fn every_null_flavored_value_adds_a_data_absent_coding() {
        let mut ctx = ConversionContext::standalone();
        let observation = Observation {
            values: vec![
                AnyValue::Cd(Cd {
                    null_flavor: Some(NullFlavor::Ni),
                    ..Default::default()
                }),
                AnyValue::Cd(Cd {
                    null_flavor: Some(NullFlavor::Unk),
                    ..Default::default()
                }),
            ],
            ..Default::default()
        };
        let bundle = transformer()
            .transform_observation(&mut ctx, &observation)
            .expect("observation bundle");
        let Resource::Observation(target) = bundle.primary() else {
            panic!("expected Observation primary");
        };
        let reason = target.data_absent_reason.as_ref().expect("data absent reason");
        assert_eq!(reason.coding.len(), 2);
        assert!(reason
            .coding
            .iter()
            .all(|coding| coding.code.as_deref() == Some("unknown")));
        assert!(target.value.is_none());
    }

    #[test]
    fn present_and_null_flavored_values_fill_both_slots() {
        let mut ctx = ConversionContext::standalone();
        let observation = Observation {
            values: vec![
                AnyValue::Pq(pq(72.0, "/min")),
                AnyValue::Pq(Pq {
                    null_flavor: Some(NullFlavor::Msk),
                    ..Default::default()
                }),
            ],
            ..Default::default()
        };
        let bundle = transformer()
            .transform_vital_sign_observation(&mut ctx, &observation)
            .expect("observation bundle");
        let Resource::Observation(target) = bundle.primary() else {
            panic!("expected Observation primary");
        };
        match &target.value {
            Some(ObservationValue::Quantity(quantity)) => {
                assert_eq!(quantity.value, Some(72.0));
                assert_eq!(quantity.unit.as_deref(), Some("/min"));
            }
            other => panic!("expected quantity value, got {other:?}"),
        }
        let reason = target.data_absent_reason.as_ref().expect("data absent reason");
        assert_eq!(reason.coding.len(), 1);
        assert_eq!(reason.first_code(), Some("masked"));
    }

    #[test]
    fn last_value_wins() {
        let mut ctx = ConversionContext::standalone();
        let observation = Observation {
            values: vec![
                AnyValue::Pq(pq(1.0, "kg")),
                AnyValue::Unknown,
                AnyValue::Cd(cd("LA6576-8")),
            ],
            ..Default::default()
        };
        let bundle = transformer()
            .transform_observation(&mut ctx, &observation)
            .expect("observation bundle");
        let Resource::Observation(target) = bundle.primary() else {
            panic!("expected Observation primary");
        };
        assert!(matches!(
            target.value,
            Some(ObservationValue::CodeableConcept(_))
        ));
    }

    #[test]
    fn empty_reference_range_is_dropped() {
        let range = ReferenceRange {
            observation_range: Some(ObservationRange {
                text: Some(Ed {
                    text: Some(String::new()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            null_flavor: None,
        };
        assert!(transformer().transform_reference_range(&range).is_none());
    }

    #[test]
    fn result_organizer_references_each_result() {
        let mut ctx = ConversionContext::standalone();
        let organizer = Organizer {
            code: Some(cd("57021-8")),
            status_code: Some(Cd {
                code: Some("completed".into()),
                ..Default::default()
            }),
            authors: vec![Author {
                time: Some(Ts::new("20120806101500-0500")),
                assigned_author: Some(AssignedAuthor::default()),
                null_flavor: None,
            }],
            components: vec![
                ClinicalStatement::ResultObservation(hemoglobin()),
                ClinicalStatement::ResultObservation(Observation {
                    null_flavor: Some(NullFlavor::Ni),
                    ..Default::default()
                }),
                ClinicalStatement::Unknown,
            ],
            ..Default::default()
        };

        let bundle = transformer()
            .transform_result_organizer(&mut ctx, &organizer)
            .expect("report bundle");
        let Resource::DiagnosticReport(report) = bundle.primary() else {
            panic!("expected DiagnosticReport primary");
        };
        assert_eq!(report.result.len(), 1);
        assert!(matches!(
            bundle.get(report.result[0].target()),
            Some(Resource::Observation(_))
        ));
        assert_eq!(report.status, Some(DiagnosticReportStatus::Final));
        assert!(report.issued.is_some());
        let performer = report.performer.as_ref().expect("performer");
        assert!(bundle.get(performer.target()).is_some());
    }

    #[test]
    fn functional_status_links_assistive_device() {
        let mut ctx = ConversionContext::standalone();
        let supply = Supply {
            participants: vec![Participant2 {
                type_code: Some("DEV".into()),
                participant_role: Some(ParticipantRole {
                    class_code: Some("MANU".into()),
                    playing_device: Some(PlayingDevice {
                        code: Some(Cd {
                            code: Some("58938008".into()),
                            display_name: Some("Wheelchair".into()),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        };
        let observation = Observation {
            code: Some(cd("54522-8")),
            values: vec![AnyValue::Cd(cd("371153006"))],
            authors: vec![Author {
                assigned_author: Some(AssignedAuthor::default()),
                ..Default::default()
            }],
            entry_relationships: vec![EntryRelationship {
                statement: Some(ClinicalStatement::NonMedicinalSupplyActivity(supply)),
                ..Default::default()
            }],
            ..Default::default()
        };

        let bundle = transformer()
            .transform_functional_status_observation(&mut ctx, &observation)
            .expect("observation bundle");
        let Resource::Observation(target) = bundle.primary() else {
            panic!("expected Observation primary");
        };
        assert_eq!(target.category.as_ref().and_then(|c| c.first_code()), Some("54522-8"));
        assert_eq!(target.code.as_ref().and_then(|c| c.first_code()), Some("371153006"));
        let device = target.device.as_ref().expect("device");
        match bundle.get(device.target()) {
            Some(Resource::Device(device)) => {
                assert_eq!(
                    device.type_code.as_ref().and_then(|c| c.first_code()),
                    Some("58938008")
                );
            }
            other => panic!("expected Device satellite, got {other:?}"),
        }
        assert_eq!(target.performer.len(), 1);
    }
}
