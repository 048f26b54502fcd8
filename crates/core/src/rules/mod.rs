//! Conversion rules, one `impl ResourceTransformer` block per clinical area.
//!
//! - [`participants`]: practitioners, organizations, locations, substances, devices, groups
//! - [`patient`]: the patient role with its guardians and language communications
//! - [`problems`]: allergies, problem concerns, indications, family history
//! - [`encounters`]: encounters and procedures
//! - [`medications`]: medication activities, dispenses, immunizations
//! - [`observations`]: observations, result organizers, functional status
//! - [`document`]: the Composition, its sections and entry dispatch
//!
//! Element rules return `Option<ResourceBundle>`. Helpers for fragments that several rules
//! share (organization, location, substance, device, group, indication condition) return the
//! bare resource, and the calling rule adds it to its satellites.

pub mod document;
pub mod encounters;
pub mod medications;
pub mod observations;
pub mod participants;
pub mod patient;
pub mod problems;
