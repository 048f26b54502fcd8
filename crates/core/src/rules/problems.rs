//! Allergies, problems, indications and family history.

use crate::bundle::{ResourceBundle, Satellites};
use crate::context::ConversionContext;
use crate::transformer::{is_absent, mapped, status_code, ResourceTransformer};
use cda::statements::{
    related_age_observations, related_allergy_observations, related_death_observations,
    related_encounters, related_problem_observations, related_reaction_observations,
    related_severity_observations, Act, ClinicalStatement, Observation, Organizer,
};
use cda::{present, present_items, AnyValue, IvlTs};
use fhir::datatypes::{Age, DateTime};
use fhir::{
    AllergyIntolerance, AllergyIntoleranceReaction, Condition, FamilyMemberHistory,
    FamilyMemberHistoryCondition, ResourceKind,
};

impl ResourceTransformer {
    /// Allergy problem act → AllergyIntolerance.
    ///
    /// Substance, category and reactions come from the allergy observations beneath the act.
    /// Substance and category follow last-write-wins across observations.
    pub fn transform_allergy_problem_act(
        &self,
        ctx: &mut ConversionContext,
        act: &Act,
    ) -> Option<ResourceBundle> {
        if is_absent(act, "allergyProblemAct") {
            return None;
        }
        let dtt = self.data_types();
        let vst = self.value_sets();
        let mut allergy = AllergyIntolerance::new(ctx.next_id(ResourceKind::AllergyIntolerance));
        let mut satellites = Satellites::new();

        allergy.identifier = dtt.identifiers(&act.ids);
        allergy.patient = ctx.patient_reference();
        for author in &act.authors {
            if let Some(recorder) = satellites.absorb(self.transform_author(ctx, author)) {
                allergy.recorder = Some(recorder);
            }
        }
        allergy.status = status_code(act.status_code.as_ref())
            .and_then(|code| mapped(vst.allergy_status(code), code, "AllergyIntoleranceStatus"));
        allergy.onset = self.onset(act.effective_time.as_ref());

        for observation in related_allergy_observations(&act.entry_relationships) {
            for participant in present_items(&observation.participants) {
                let code = present(participant.participant_role.as_ref())
                    .and_then(|role| present(role.playing_entity.as_ref()))
                    .and_then(|entity| self.concept(entity.code.as_ref()));
                if code.is_some() {
                    allergy.substance = code;
                }
            }
            for value in observation.coded_values() {
                if let Some(code) = value.code_value() {
                    if let Some(category) =
                        mapped(vst.allergy_category(code), code, "AllergyIntoleranceCategory")
                    {
                        allergy.category = Some(category);
                    }
                }
            }
            allergy.reaction.extend(
                related_reaction_observations(&observation.entry_relationships)
                    .map(|reaction| self.reaction(reaction)),
            );
        }

        Some(ResourceBundle::new(allergy, satellites))
    }

    fn reaction(&self, observation: &Observation) -> AllergyIntoleranceReaction {
        let vst = self.value_sets();
        AllergyIntoleranceReaction {
            manifestation: self.concepts(observation.coded_values()),
            severity: related_severity_observations(&observation.entry_relationships)
                .flat_map(Observation::coded_values)
                .filter_map(|cd| cd.code_value())
                .filter_map(|code| mapped(vst.allergy_severity(code), code, "AllergyIntoleranceSeverity"))
                .last(),
            onset: present(observation.effective_time.as_ref())
                .and_then(|time| time.low.as_ref())
                .and_then(|low| self.data_types().date_time(low)),
        }
    }

    /// Problem concern act → one Condition per problem observation.
    ///
    /// The first Condition is the primary; its siblings follow as satellites. All of them
    /// share the act's identifiers, encounter and asserting practitioner, which are created
    /// once. An act without problem observations yields nothing.
    pub fn transform_problem_concern_act(
        &self,
        ctx: &mut ConversionContext,
        act: &Act,
    ) -> Option<ResourceBundle> {
        if is_absent(act, "problemConcernAct") {
            return None;
        }
        let problems: Vec<&Observation> =
            related_problem_observations(&act.entry_relationships).collect();
        if problems.is_empty() {
            tracing::warn!("problem concern act has no problem observations; skipping");
            return None;
        }

        let ids: Vec<_> = problems
            .iter()
            .map(|_| ctx.next_id(ResourceKind::Condition))
            .collect();
        let encounter = related_encounters(&act.entry_relationships)
            .next()
            .and_then(|encounter| self.transform_encounter(ctx, encounter));
        let asserters: Vec<ResourceBundle> = act
            .authors
            .iter()
            .filter_map(|author| self.transform_author(ctx, author))
            .collect();

        let dtt = self.data_types();
        let identifiers = dtt.identifiers(&act.ids);
        let encounter_ref = encounter.as_ref().map(ResourceBundle::primary_reference);
        let asserter_ref = asserters.last().map(ResourceBundle::primary_reference);

        let mut conditions = problems.into_iter().zip(ids).map(|(problem, id)| {
            let mut condition = self.problem_condition(Condition::new(id), problem);
            condition.identifier = identifiers.clone();
            condition.patient = ctx.patient_reference();
            condition.encounter = encounter_ref.clone();
            condition.asserter = asserter_ref.clone();
            condition
        });

        let primary = conditions.next()?;
        let mut satellites = Satellites::new();
        for sibling in conditions {
            satellites.add(sibling);
        }
        satellites.absorb(encounter);
        for asserter in asserters {
            satellites.merge(asserter);
        }
        Some(ResourceBundle::new(primary, satellites))
    }

    fn problem_condition(&self, mut condition: Condition, problem: &Observation) -> Condition {
        let dtt = self.data_types();
        let vst = self.value_sets();
        condition.category = problem
            .code
            .as_ref()
            .and_then(|cd| cd.code_value())
            .and_then(|code| mapped(vst.condition_category(code), code, "ConditionCategory"))
            .map(|category| category.to_codeable_concept());
        condition.code = self.last_concept(problem.coded_values());
        if let Some(time) = present(problem.effective_time.as_ref()) {
            condition.onset_date_time = self.onset(Some(time));
            condition.abatement_date_time = time.high.as_ref().and_then(|high| dtt.date_time(high));
        }
        condition.date_recorded = present_items(&problem.authors)
            .filter_map(|author| author.time.as_ref())
            .filter_map(|time| dtt.date(time))
            .last();
        condition
    }

    /// Indication → Condition.
    ///
    /// Sub-fragment helper: returns the bare resource for the caller to add to its own
    /// satellites, so no bundle is built here.
    ///
    /// An effective time carrying only a point value becomes the onset; otherwise low and
    /// high become onset and abatement.
    pub fn transform_indication(
        &self,
        ctx: &mut ConversionContext,
        indication: &Observation,
    ) -> Option<Condition> {
        if is_absent(indication, "indication") {
            return None;
        }
        let dtt = self.data_types();
        let vst = self.value_sets();
        let mut condition = Condition::new(ctx.next_id(ResourceKind::Condition));
        condition.identifier = dtt.identifiers(&indication.ids);
        condition.patient = ctx.patient_reference();
        condition.category = indication
            .code
            .as_ref()
            .and_then(|cd| cd.code_value())
            .and_then(|code| mapped(vst.condition_category(code), code, "ConditionCategory"))
            .map(|category| category.to_codeable_concept());
        if let Some(time) = present(indication.effective_time.as_ref()) {
            if time.low.is_none() && time.high.is_none() {
                condition.onset_date_time =
                    time.value.as_deref().and_then(|v| dtt.date_time_from_text(v));
            } else {
                condition.onset_date_time = time.low.as_ref().and_then(|low| dtt.date_time(low));
                condition.abatement_date_time =
                    time.high.as_ref().and_then(|high| dtt.date_time(high));
            }
        }
        condition.code = self.last_concept(indication.coded_values());
        Some(condition)
    }

    /// Family history organizer → FamilyMemberHistory.
    ///
    /// Each family history observation adds a condition. A death observation beneath it marks
    /// the relative deceased and supplies that condition's outcome.
    pub fn transform_family_history_organizer(
        &self,
        ctx: &mut ConversionContext,
        organizer: &Organizer,
    ) -> Option<ResourceBundle> {
        if is_absent(organizer, "familyHistoryOrganizer") {
            return None;
        }
        let dtt = self.data_types();
        let vst = self.value_sets();
        let mut history = FamilyMemberHistory::new(ctx.next_id(ResourceKind::FamilyMemberHistory));
        history.identifier = dtt.identifiers(&organizer.ids);
        history.patient = ctx.patient_reference();
        history.status = status_code(organizer.status_code.as_ref())
            .and_then(|code| mapped(vst.family_history_status(code), code, "FamilyHistoryStatus"));

        for component in present_items(&organizer.components) {
            let ClinicalStatement::FamilyHistoryObservation(observation) = component else {
                continue;
            };
            let mut condition = FamilyMemberHistoryCondition {
                code: self.last_concept(observation.coded_values()),
                ..Default::default()
            };
            for death in related_death_observations(&observation.entry_relationships) {
                history.deceased_boolean = Some(true);
                if let Some(outcome) = self.last_concept(death.coded_values()) {
                    condition.outcome = Some(outcome);
                }
            }
            condition.onset_quantity = related_age_observations(&observation.entry_relationships)
                .filter_map(|age| self.transform_age_observation(age))
                .last();
            history.condition.push(condition);
        }

        let related = present(organizer.subject.as_ref())
            .and_then(|subject| present(subject.related_subject.as_ref()));
        if let Some(related) = related {
            history.relationship = self.concept(related.code.as_ref());
            if let Some(person) = present(related.subject.as_ref()) {
                history.name = present_items(&person.names)
                    .filter_map(|pn| pn.text.as_deref().filter(|t| !t.is_empty()))
                    .last()
                    .map(str::to_owned);
                history.gender = person
                    .administrative_gender_code
                    .as_ref()
                    .and_then(|cd| cd.code_value())
                    .and_then(|code| {
                        mapped(vst.administrative_gender(code), code, "AdministrativeGender")
                    });
                history.born_date = person.birth_time.as_ref().and_then(|ts| dtt.date(ts));
            }
        }

        Some(ResourceBundle::single(history))
    }

    /// Age observation → Age. The last physical quantity with a value wins.
    pub fn transform_age_observation(&self, observation: &Observation) -> Option<Age> {
        if is_absent(observation, "ageObservation") {
            return None;
        }
        present_items(&observation.values)
            .filter_map(AnyValue::as_pq)
            .filter(|pq| pq.value.is_some())
            .filter_map(|pq| self.data_types().quantity(pq))
            .last()
    }

    /// Onset of an act or observation: the low bound, else the point value.
    fn onset(&self, time: Option<&IvlTs>) -> Option<DateTime> {
        let time = present(time)?;
        let dtt = self.data_types();
        match present(time.low.as_ref()) {
            Some(low) => dtt.date_time(low),
            None => time.value.as_deref().and_then(|v| dtt.date_time_from_text(v)),
        }
    }
}
