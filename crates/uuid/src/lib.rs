//! Identity tokens for converted resources.
//!
//! Every target resource produced by the converter is identified by its kind plus an opaque
//! token. This crate owns the token side of that pair:
//!
//! - [`UuidService`]: a random UUID in canonical form (**32 lowercase hexadecimal characters**,
//!   no hyphens). Used whenever no document-level numbering scheme exists.
//! - [`IdToken`]: the opaque, validated token stored on a resource identity.
//! - [`TokenGenerator`]: a per-document source of tokens, either random UUIDs or a sequential
//!   counter, selected through [`IdStrategy`].
//!
//! ## Token form
//! FHIR logical ids are limited to `[A-Za-z0-9\-\.]{1,64}`. Both generated forms satisfy this:
//! - UUID: `550e8400e29b41d4a716446655440000`
//! - Counter: `1`, `2`, `3`, …
//!
//! A generator is owned by exactly one conversion; it is never shared between documents, so two
//! parallel conversions cannot interfere with each other's numbering.

mod service;

pub use service::{IdStrategy, IdToken, TokenGenerator, Uuid, UuidService};

/// Error type for identity token operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identity token operations.
pub type UuidResult<T> = Result<T, UuidError>;
