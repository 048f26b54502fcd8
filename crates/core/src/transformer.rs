//! The resource transformer: one conversion rule per source element kind.
//!
//! Rules live in [`crate::rules`] as `impl ResourceTransformer` blocks grouped by clinical area.
//! Every rule has the same shape:
//!
//! - it takes the [`ConversionContext`] of the current conversion and one source element;
//! - an absent (null-flavored) element yields `None` and allocates nothing;
//! - otherwise it allocates the identity of its primary resource first, converts each present
//!   field, folds child rule output into [`Satellites`](crate::Satellites), and seals a
//!   [`ResourceBundle`](crate::ResourceBundle).
//!
//! Rules never fail. Unmapped codes and unusable values leave the target field unset.

use crate::datatypes::{DataTypesTransformer, DefaultDataTypes};
use crate::value_sets::{DefaultValueSets, ValueSetsTransformer};
use cda::{Cd, NullFlavored};
use fhir::datatypes::CodeableConcept;
use std::sync::Arc;

/// Converts C-CDA elements into FHIR resources.
///
/// The transformer itself is stateless; per-conversion state lives in the context passed to
/// every rule, so one transformer can serve any number of concurrent conversions.
#[derive(Clone)]
pub struct ResourceTransformer {
    dtt: Arc<dyn DataTypesTransformer>,
    vst: Arc<dyn ValueSetsTransformer>,
}

impl ResourceTransformer {
    /// Create a transformer with substitute data type and value set collaborators.
    pub fn new(dtt: Arc<dyn DataTypesTransformer>, vst: Arc<dyn ValueSetsTransformer>) -> Self {
        Self { dtt, vst }
    }

    pub fn data_types(&self) -> &dyn DataTypesTransformer {
        self.dtt.as_ref()
    }

    pub fn value_sets(&self) -> &dyn ValueSetsTransformer {
        self.vst.as_ref()
    }

    /// Converts an optional coded element.
    pub(crate) fn concept(&self, cd: Option<&Cd>) -> Option<CodeableConcept> {
        cd.and_then(|cd| self.dtt.codeable_concept(cd))
    }

    /// Converts every present coded value, in document order.
    pub(crate) fn concepts<'a>(
        &self,
        values: impl IntoIterator<Item = &'a Cd>,
    ) -> Vec<CodeableConcept> {
        values
            .into_iter()
            .filter_map(|cd| self.dtt.codeable_concept(cd))
            .collect()
    }

    /// Converts the last present coded value; repeated values overwrite earlier ones.
    pub(crate) fn last_concept<'a>(
        &self,
        values: impl IntoIterator<Item = &'a Cd>,
    ) -> Option<CodeableConcept> {
        values
            .into_iter()
            .filter_map(|cd| self.dtt.codeable_concept(cd))
            .last()
    }
}

impl Default for ResourceTransformer {
    fn default() -> Self {
        Self::new(Arc::new(DefaultDataTypes), Arc::new(DefaultValueSets))
    }
}

impl std::fmt::Debug for ResourceTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceTransformer").finish_non_exhaustive()
    }
}

/// True when `element` is null-flavored. Logs the skip.
pub(crate) fn is_absent<T: NullFlavored>(element: &T, what: &'static str) -> bool {
    match element.null_flavor() {
        Some(null_flavor) => {
            tracing::debug!(
                element = what,
                null_flavor = null_flavor.as_code(),
                "skipping absent element"
            );
            true
        }
        None => false,
    }
}

/// The code of a present status element.
pub(crate) fn status_code(status: Option<&Cd>) -> Option<&str> {
    status.and_then(Cd::code_value)
}

/// Logs a code that has no target mapping and passes the result through.
pub(crate) fn mapped<T>(value: Option<T>, code: &str, value_set: &'static str) -> Option<T> {
    if value.is_none() {
        tracing::debug!(code, value_set, "no mapping for code");
    }
    value
}
