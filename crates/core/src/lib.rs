//! # cda2fhir core
//!
//! The resource graph assembler: converts a C-CDA source tree into a flat, de-duplicated set of
//! FHIR resources whose references all resolve within the set.
//!
//! - [`ResourceTransformer`]: one conversion rule per source element kind, see [`rules`]
//! - [`ResourceBundle`] / [`Satellites`]: the primary resource of a rule plus everything it had
//!   to create
//! - [`ConversionContext`]: per-document identity allocation and patient reference
//! - [`DataTypesTransformer`] / [`ValueSetsTransformer`]: substitutable primitive and
//!   terminology collaborators
//! - [`CcdaTransformer`]: whole-document conversion into a FHIR collection bundle
//!
//! **No I/O**: reading files, choosing output formats and installing a tracing subscriber
//! belong in the `cda2fhir` binary.

pub mod bundle;
pub mod ccda;
pub mod config;
pub mod constants;
pub mod context;
pub mod datatypes;
pub mod error;
pub mod rules;
pub mod transformer;
pub mod value_sets;

pub use bundle::{ResourceBundle, Satellites};
pub use ccda::CcdaTransformer;
pub use config::{id_strategy_from_env_value, CoreConfig};
pub use context::ConversionContext;
pub use datatypes::{DataTypesTransformer, DefaultDataTypes};
pub use error::{ConversionError, ConversionResult};
pub use transformer::ResourceTransformer;
pub use value_sets::{DefaultValueSets, ValueSetsTransformer};
