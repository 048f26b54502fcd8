//! Document conversion entry point.
//!
//! [`CcdaTransformer`] owns the configuration and the rule set. Each call creates a fresh
//! [`ConversionContext`], so one transformer can convert any number of documents, including
//! from several threads at once.

use crate::config::CoreConfig;
use crate::context::ConversionContext;
use crate::error::{ConversionError, ConversionResult};
use crate::transformer::ResourceTransformer;
use cda::ClinicalDocument;
use std::sync::Arc;

/// Converts whole C-CDA documents into FHIR collection bundles.
#[derive(Clone, Debug)]
pub struct CcdaTransformer {
    cfg: Arc<CoreConfig>,
    rules: ResourceTransformer,
}

impl CcdaTransformer {
    /// Creates a transformer with the default data type and value set collaborators.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self::with_rules(cfg, ResourceTransformer::default())
    }

    pub fn with_rules(cfg: Arc<CoreConfig>, rules: ResourceTransformer) -> Self {
        Self { cfg, rules }
    }

    pub fn rules(&self) -> &ResourceTransformer {
        &self.rules
    }

    /// Converts one document into a bundle with the Composition as its first entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::MissingDocument`] if the document itself is null-flavored.
    pub fn convert_document(&self, document: &ClinicalDocument) -> ConversionResult<fhir::Bundle> {
        let mut ctx = ConversionContext::for_document(&self.cfg);
        let bundle = self
            .rules
            .transform_clinical_document(&mut ctx, document)
            .ok_or(ConversionError::MissingDocument)?;
        tracing::info!(
            resources = bundle.len(),
            composition = %bundle.primary_id(),
            "converted document"
        );
        Ok(bundle.into_fhir_bundle())
    }

    /// Parses a YAML document and converts it.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Cda`] if the text is not a clinical document, or
    /// [`ConversionError::MissingDocument`] as for [`Self::convert_document`].
    pub fn convert_yaml(&self, yaml: &str) -> ConversionResult<fhir::Bundle> {
        let document = cda::read_document_yaml(yaml)?;
        self.convert_document(&document)
    }

    /// Parses a JSON document and converts it.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Cda`] if the text is not a clinical document, or
    /// [`ConversionError::MissingDocument`] as for [`Self::convert_document`].
    pub fn convert_json(&self, json: &str) -> ConversionResult<fhir::Bundle> {
        let document = cda::read_document_json(json)?;
        self.convert_document(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cda2fhir_uuid::IdStrategy;
    use fhir::{Resource, ResourceKind};
    use std::collections::HashSet;

    fn counter_transformer() -> CcdaTransformer {
        let cfg = CoreConfig::new(IdStrategy::Counter, "0").expect("config");
        CcdaTransformer::new(Arc::new(cfg))
    }

    const CCD: &str = r#"
id:
  root: 2.16.840.1.113883.19.5.99999.1
  extension: TT988
code:
  code: 34133-9
  codeSystem: 2.16.840.1.113883.6.1
  displayName: Summarization of Episode Note
title:
  text: Continuity of Care Document
effectiveTime:
  value: "20120815"
confidentialityCode:
  code: "N"
recordTargets:
  - patientRole:
      ids:
        - root: 2.16.840.1.113883.19.5.99999.2
          extension: "998991"
      patient:
        names:
          - given: [Isabella]
            family: [Jones]
        administrativeGenderCode:
          code: "F"
        birthTime:
          value: "19750501"
authors:
  - time:
      value: "20120815"
    assignedAuthor:
      ids:
        - root: 2.16.840.1.113883.4.6
          extension: "99999999"
      assignedPerson:
        names:
          - given: [Henry]
            family: [Seven]
      representedOrganization:
        names:
          - text: Community Health and Hospitals
sections:
  - title:
      text: ALLERGIES
    entries:
      - type: AllergyProblemAct
        statusCode:
          code: active
        authors:
          - assignedAuthor:
              ids:
                - root: 2.16.840.1.113883.4.6
                  extension: "99999999"
        entryRelationships:
          - typeCode: SUBJ
            statement:
              type: AllergyObservation
              values:
                - type: CD
                  code: "416098002"
                  codeSystem: 2.16.840.1.113883.6.96
              participants:
                - typeCode: CSM
                  participantRole:
                    playingEntity:
                      code:
                        code: "70618"
                        codeSystem: 2.16.840.1.113883.6.88
                        displayName: Penicillin
  - title:
      text: PROBLEMS
    entries:
      - type: ProblemConcernAct
        ids:
          - root: ec8a6ff8-ed4b-4f7e-82c3-e98e58b45de7
        authors:
          - assignedAuthor: {}
        entryRelationships:
          - typeCode: SUBJ
            statement:
              type: ProblemObservation
              code:
                code: "55607006"
              values:
                - type: CD
                  code: "233604007"
                  codeSystem: 2.16.840.1.113883.6.96
          - typeCode: SUBJ
            statement:
              type: ProblemObservation
              values:
                - type: CD
                  code: "195967001"
                  codeSystem: 2.16.840.1.113883.6.96
  - title:
      text: MEDICATIONS
    entries:
      - type: MedicationActivity
        negationInd: true
        consumable:
          manufacturedProduct:
            manufacturedMaterial:
              code:
                code: "573621"
                codeSystem: 2.16.840.1.113883.6.88
        entryRelationships:
          - typeCode: RSON
            statement:
              type: Indication
              values:
                - type: CD
                  code: "233604007"
  - title:
      text: FAMILY HISTORY
    entries:
      - type: FamilyHistoryOrganizer
        statusCode:
          code: completed
        subject:
          relatedSubject:
            code:
              code: FTH
        components:
          - type: FamilyHistoryObservation
            values:
              - type: CD
                code: "22298006"
            entryRelationships:
              - typeCode: CAUS
                statement:
                  type: FamilyHistoryDeathObservation
                  values:
                    - type: CD
                      code: "419099009"
"#;

    fn convert(transformer: &CcdaTransformer) -> fhir::Bundle {
        transformer.convert_yaml(CCD).expect("conversion")
    }

    #[test]
    fn document_bundle_has_no_dangling_references() {
        let bundle = convert(&counter_transformer());
        assert!(matches!(
            bundle.resources().next(),
            Some(Resource::Composition(_))
        ));
        assert_eq!(bundle.dangling_references().expect("references"), Vec::<String>::new());
    }

    #[test]
    fn identities_are_unique_within_a_document() {
        let bundle = convert(&counter_transformer());
        let mut seen = HashSet::new();
        for resource in bundle.resources() {
            assert!(seen.insert(resource.id().clone()), "duplicate {}", resource.id());
        }
    }

    #[test]
    fn every_patient_reference_points_at_the_document_patient() {
        let bundle = convert(&counter_transformer());
        let patients: Vec<_> = bundle
            .resources()
            .filter(|resource| resource.kind() == ResourceKind::Patient)
            .collect();
        assert_eq!(patients.len(), 1);
        let patient = patients[0].reference();

        for resource in bundle.resources() {
            let referenced = match resource {
                Resource::AllergyIntolerance(r) => r.patient.clone(),
                Resource::Condition(r) => r.patient.clone(),
                Resource::MedicationStatement(r) => r.patient.clone(),
                Resource::FamilyMemberHistory(r) => r.patient.clone(),
                Resource::Composition(r) => r.subject.clone(),
                _ => continue,
            };
            assert_eq!(referenced.as_ref(), Some(&patient), "{}", resource.id());
        }
    }

    #[test]
    fn allergy_problem_medication_and_family_history_are_converted() {
        let bundle = convert(&counter_transformer());
        let allergy = bundle
            .resources()
            .find_map(|resource| match resource {
                Resource::AllergyIntolerance(allergy) => Some(allergy),
                _ => None,
            })
            .expect("allergy");
        assert!(allergy.reaction.is_empty());
        assert!(allergy.substance.is_some());

        let conditions = bundle
            .resources()
            .filter(|resource| resource.kind() == ResourceKind::Condition)
            .count();
        // two problems plus the medication indication
        assert_eq!(conditions, 3);

        let statement = bundle
            .resources()
            .find_map(|resource| match resource {
                Resource::MedicationStatement(statement) => Some(statement),
                _ => None,
            })
            .expect("medication statement");
        assert_eq!(statement.was_not_taken, Some(false));

        let history = bundle
            .resources()
            .find_map(|resource| match resource {
                Resource::FamilyMemberHistory(history) => Some(history),
                _ => None,
            })
            .expect("family member history");
        assert_eq!(history.deceased_boolean, Some(true));
    }

    #[test]
    fn counter_strategy_output_is_reproducible() {
        let transformer = counter_transformer();
        let first = convert(&transformer).render_json(false).expect("json");
        let second = convert(&transformer).render_json(false).expect("json");
        assert_eq!(first, second);
        assert!(first.contains("Composition/1"));
    }

    #[test]
    fn parallel_conversions_do_not_interfere() {
        let transformer = counter_transformer();
        let expected = convert(&transformer).render_json(false).expect("json");
        let outputs: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| convert(&transformer).render_json(false).expect("json")))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("thread"))
                .collect()
        });
        for output in outputs {
            assert_eq!(output, expected);
        }
    }

    #[test]
    fn uuid_strategy_gives_fresh_identities_per_document() {
        let transformer = CcdaTransformer::new(Arc::new(CoreConfig::default()));
        let first = convert(&transformer);
        let second = convert(&transformer);
        let first_ids: HashSet<_> = first.resources().map(|r| r.id().clone()).collect();
        assert!(second.resources().all(|r| !first_ids.contains(r.id())));
    }

    #[test]
    fn null_flavored_document_is_an_error() {
        let err = counter_transformer()
            .convert_yaml("nullFlavor: NI\n")
            .expect_err("absent document");
        match err {
            ConversionError::MissingDocument => {}
            other => panic!("expected MissingDocument, got {other:?}"),
        }
    }

    #[test]
    fn malformed_document_reports_source_error() {
        let err = counter_transformer()
            .convert_json("{\"sections\": 3}")
            .expect_err("malformed document");
        match err {
            ConversionError::Cda(_) => {}
            other => panic!("expected Cda error, got {other:?}"),
        }
    }
}
