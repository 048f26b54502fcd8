//! Constants used throughout the converter core.

/// Environment variable selecting the identity strategy (`uuid` or `counter`).
pub const ID_STRATEGY_ENV: &str = "CDA2FHIR_ID_STRATEGY";

/// Token of the placeholder patient reference used outside a document conversion.
pub const DEFAULT_PLACEHOLDER_PATIENT_COUNTER: u64 = 0;

// Identifier systems.
pub const URI_SYSTEM: &str = "urn:ietf:rfc:3986";
pub const OID_URN_PREFIX: &str = "urn:oid:";
pub const UUID_URN_PREFIX: &str = "urn:uuid:";

// Patient extensions.
pub const RACE_EXTENSION_URL: &str = "http://hl7.org/fhir/StructureDefinition/us-core-race";
pub const ETHNICITY_EXTENSION_URL: &str =
    "http://hl7.org/fhir/StructureDefinition/us-core-ethnicity";
pub const RELIGION_EXTENSION_URL: &str =
    "http://hl7.org/fhir/StructureDefinition/us-core-religion";
pub const BIRTH_PLACE_EXTENSION_URL: &str = "http://hl7.org/fhir/StructureDefinition/birthPlace";

/// XHTML namespace of narrative `div` elements.
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Well-known HL7 code system OIDs and their FHIR system URIs.
pub const CODE_SYSTEMS: &[(&str, &str)] = &[
    ("2.16.840.1.113883.6.1", "http://loinc.org"),
    ("2.16.840.1.113883.6.96", "http://snomed.info/sct"),
    ("2.16.840.1.113883.6.88", "http://www.nlm.nih.gov/research/umls/rxnorm"),
    ("2.16.840.1.113883.12.292", "http://hl7.org/fhir/sid/cvx"),
    ("2.16.840.1.113883.6.69", "http://hl7.org/fhir/sid/ndc"),
    ("2.16.840.1.113883.6.103", "http://hl7.org/fhir/sid/icd-9-cm"),
    ("2.16.840.1.113883.6.90", "http://hl7.org/fhir/sid/icd-10-cm"),
    ("2.16.840.1.113883.6.3", "http://hl7.org/fhir/sid/icd-10"),
    ("2.16.840.1.113883.6.12", "http://www.ama-assn.org/go/cpt"),
    ("2.16.840.1.113883.6.8", "http://unitsofmeasure.org"),
    ("2.16.840.1.113883.6.101", "http://nucc.org/provider-taxonomy"),
    ("2.16.840.1.113883.3.26.1.1", "http://ncimeta.nci.nih.gov"),
    ("2.16.840.1.113883.6.238", "http://hl7.org/fhir/v3/Race"),
    ("2.16.840.1.113883.5.1", "http://hl7.org/fhir/v3/AdministrativeGender"),
    ("2.16.840.1.113883.5.2", "http://hl7.org/fhir/v3/MaritalStatus"),
    ("2.16.840.1.113883.5.4", "http://hl7.org/fhir/v3/ActCode"),
    ("2.16.840.1.113883.5.6", "http://hl7.org/fhir/v3/ActClass"),
    ("2.16.840.1.113883.5.25", "http://hl7.org/fhir/v3/Confidentiality"),
    ("2.16.840.1.113883.5.83", "http://hl7.org/fhir/v3/ObservationInterpretation"),
    ("2.16.840.1.113883.5.90", "http://hl7.org/fhir/v3/ParticipationType"),
    ("2.16.840.1.113883.5.111", "http://hl7.org/fhir/v3/RoleCode"),
    ("2.16.840.1.113883.5.112", "http://hl7.org/fhir/v3/RouteOfAdministration"),
    ("2.16.840.1.113883.5.1063", "http://hl7.org/fhir/v3/ObservationValue"),
    ("2.16.840.1.113883.5.1076", "http://hl7.org/fhir/v3/ReligiousAffiliation"),
    ("2.16.840.1.113883.6.121", "urn:ietf:bcp:47"),
];
