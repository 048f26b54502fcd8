//! Internal implementation of identity token services.

use crate::{UuidError, UuidResult};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Maximum length of a FHIR logical id.
const MAX_TOKEN_LEN: usize = 64;

/// A random UUID in canonical form (32 lowercase hex characters, no hyphens).
///
/// Once constructed, the contained UUID is guaranteed to display in canonical form, which is
/// also a valid FHIR logical id.
///
/// # Construction
/// - [`UuidService::new`] generates a new random UUID.
/// - [`UuidService::parse`] validates an externally supplied identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UuidService(Uuid);

impl Default for UuidService {
    fn default() -> Self {
        Self::new()
    }
}

impl UuidService {
    /// Generates a new random (version 4) UUID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses a UUID string that must already be in canonical form.
    ///
    /// Hyphenated or uppercase forms are rejected rather than normalised.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "UUID must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("invalid UUID '{input}': {e}")))
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is exactly 32 lowercase hex characters.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for UuidService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for UuidService {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UuidService::parse(s)
    }
}

/// Opaque identity token of a target resource.
///
/// Combined with a resource kind this forms the resource's permanent identity. The token is
/// validated against the FHIR logical id alphabet so it can be embedded in `Kind/token`
/// references without escaping.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdToken(String);

impl IdToken {
    /// Creates a token from an arbitrary string.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is empty, longer than 64 characters, or
    /// contains characters outside `A-Z a-z 0-9 - .`.
    pub fn new(input: impl AsRef<str>) -> UuidResult<Self> {
        let input = input.as_ref();
        if input.is_empty() || input.len() > MAX_TOKEN_LEN {
            return Err(UuidError::InvalidInput(format!(
                "token must be 1 to {MAX_TOKEN_LEN} characters, got {}",
                input.len()
            )));
        }
        if !input
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
        {
            return Err(UuidError::InvalidInput(format!(
                "token contains characters outside [A-Za-z0-9-.]: '{input}'"
            )));
        }
        Ok(Self(input.to_owned()))
    }

    /// A fresh random token in canonical UUID form.
    pub fn random() -> Self {
        Self::from(UuidService::new())
    }

    /// A decimal sequence-number token. Always valid.
    pub fn from_counter(value: u64) -> Self {
        Self(value.to_string())
    }

    /// Returns the token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<UuidService> for IdToken {
    fn from(value: UuidService) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for IdToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IdToken {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IdToken::new(s)
    }
}

impl AsRef<str> for IdToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for IdToken {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for IdToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        IdToken::new(&s).map_err(serde::de::Error::custom)
    }
}

/// How a document-level [`TokenGenerator`] numbers resources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum IdStrategy {
    /// Random canonical UUID per resource.
    #[default]
    Uuid,
    /// Sequential decimal counter starting at 1, reproducible across runs.
    Counter,
}

impl IdStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            IdStrategy::Uuid => "uuid",
            IdStrategy::Counter => "counter",
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdStrategy {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uuid" => Ok(IdStrategy::Uuid),
            "counter" => Ok(IdStrategy::Counter),
            other => Err(UuidError::InvalidInput(format!(
                "unknown id strategy '{other}' (expected 'uuid' or 'counter')"
            ))),
        }
    }
}

/// Per-document source of identity tokens.
///
/// Tokens are unique for the lifetime of the generator. A counter generator yields `1`, `2`,
/// `3`, … so two generators with the same strategy produce identical sequences, which keeps
/// converted output reproducible.
#[derive(Clone, Debug)]
pub struct TokenGenerator {
    strategy: IdStrategy,
    issued: u64,
}

impl TokenGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            issued: 0,
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Number of tokens handed out so far.
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Returns the next unique token.
    pub fn next_token(&mut self) -> IdToken {
        self.issued += 1;
        match self.strategy {
            IdStrategy::Uuid => IdToken::random(),
            IdStrategy::Counter => IdToken::from_counter(self.issued),
        }
    }
}
