//! The document's patient.

use crate::bundle::{ResourceBundle, Satellites};
use crate::constants::{
    BIRTH_PLACE_EXTENSION_URL, ETHNICITY_EXTENSION_URL, RACE_EXTENSION_URL, RELIGION_EXTENSION_URL,
};
use crate::context::ConversionContext;
use crate::transformer::{is_absent, mapped, ResourceTransformer};
use cda::entities::{Guardian, LanguageCommunication, PatientPerson, PatientRole};
use cda::{present, present_items, Cd};
use fhir::datatypes::{Extension, ExtensionValue};
use fhir::{Patient, PatientCommunication, PatientContact, ResourceKind};

impl ResourceTransformer {
    /// Patient role → Patient, with the provider organization as managing organization.
    ///
    /// Race, ethnic group, religious affiliation and birthplace are carried as extensions.
    pub fn transform_patient_role(
        &self,
        ctx: &mut ConversionContext,
        role: &PatientRole,
    ) -> Option<ResourceBundle> {
        if is_absent(role, "patientRole") {
            return None;
        }
        let dtt = self.data_types();
        let mut patient = Patient::new(ctx.next_id(ResourceKind::Patient));
        let mut satellites = Satellites::new();

        patient.identifier = dtt.identifiers(&role.ids);
        patient.address = present_items(&role.addrs)
            .filter_map(|ad| dtt.address(ad))
            .collect();
        patient.telecom = present_items(&role.telecoms)
            .filter_map(|tel| dtt.contact_point(tel))
            .collect();

        if let Some(person) = present(role.patient.as_ref()) {
            self.patient_person(&mut patient, person);
        }

        patient.managing_organization = role
            .provider_organization
            .as_ref()
            .and_then(|org| self.transform_organization(ctx, org))
            .map(|org| satellites.add(org));

        Some(ResourceBundle::new(patient, satellites))
    }

    fn patient_person(&self, patient: &mut Patient, person: &PatientPerson) {
        let dtt = self.data_types();
        let vst = self.value_sets();

        patient.name = present_items(&person.names)
            .filter_map(|pn| dtt.human_name(pn))
            .collect();
        patient.gender = person
            .administrative_gender_code
            .as_ref()
            .and_then(Cd::code_value)
            .and_then(|code| mapped(vst.administrative_gender(code), code, "AdministrativeGender"));
        patient.birth_date = person.birth_time.as_ref().and_then(|ts| dtt.date(ts));
        patient.marital_status = person
            .marital_status_code
            .as_ref()
            .and_then(Cd::code_value)
            .and_then(|code| mapped(vst.marital_status(code), code, "MaritalStatus"))
            .map(|status| status.to_codeable_concept());

        let coded_extensions = [
            (RACE_EXTENSION_URL, person.race_code.as_ref()),
            (ETHNICITY_EXTENSION_URL, person.ethnic_group_code.as_ref()),
            (RELIGION_EXTENSION_URL, person.religious_affiliation_code.as_ref()),
        ];
        for (url, code) in coded_extensions {
            if let Some(concept) = self.concept(code) {
                patient.extension.push(Extension {
                    url: url.to_owned(),
                    value: ExtensionValue::CodeableConcept(concept),
                });
            }
        }
        let birthplace = present(person.birthplace.as_ref())
            .and_then(|birthplace| present(birthplace.place.as_ref()))
            .and_then(|place| place.addr.as_ref())
            .and_then(|ad| dtt.address(ad));
        if let Some(address) = birthplace {
            patient.extension.push(Extension {
                url: BIRTH_PLACE_EXTENSION_URL.to_owned(),
                value: ExtensionValue::Address(address),
            });
        }

        patient.contact = person
            .guardians
            .iter()
            .filter_map(|guardian| self.transform_guardian(guardian))
            .collect();
        patient.communication = person
            .language_communications
            .iter()
            .filter_map(|communication| self.transform_language_communication(communication))
            .collect();
    }

    /// Guardian → `Patient.contact`. Only the first address is kept.
    pub fn transform_guardian(&self, guardian: &Guardian) -> Option<PatientContact> {
        if is_absent(guardian, "guardian") {
            return None;
        }
        let dtt = self.data_types();
        Some(PatientContact {
            relationship: self.concept(guardian.code.as_ref()).into_iter().collect(),
            name: present(guardian.guardian_person.as_ref()).and_then(|person| {
                present_items(&person.names)
                    .filter_map(|pn| dtt.human_name(pn))
                    .last()
            }),
            telecom: present_items(&guardian.telecoms)
                .filter_map(|tel| dtt.contact_point(tel))
                .collect(),
            address: present_items(&guardian.addrs)
                .find_map(|ad| dtt.address(ad)),
        })
    }

    /// Language communication → `Patient.communication`.
    ///
    /// A communication without a language yields nothing.
    pub fn transform_language_communication(
        &self,
        communication: &LanguageCommunication,
    ) -> Option<PatientCommunication> {
        if is_absent(communication, "languageCommunication") {
            return None;
        }
        let language = self.concept(communication.language_code.as_ref())?;
        Some(PatientCommunication {
            language,
            preferred: communication
                .preference_ind
                .as_ref()
                .and_then(|bl| self.data_types().boolean(bl)),
        })
    }
}
