//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the document converter. Conversions never read process-wide environment
//! variables themselves, so parallel conversions and test harnesses see consistent settings.

use crate::constants::DEFAULT_PLACEHOLDER_PATIENT_COUNTER;
use crate::{ConversionError, ConversionResult};
use cda2fhir_uuid::{IdStrategy, IdToken};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    id_strategy: IdStrategy,
    placeholder_patient_token: IdToken,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::InvalidInput`] if `placeholder_patient_token` is blank and
    /// [`ConversionError::Uuid`] if it is not a valid resource token.
    pub fn new(id_strategy: IdStrategy, placeholder_patient_token: &str) -> ConversionResult<Self> {
        if placeholder_patient_token.trim().is_empty() {
            return Err(ConversionError::InvalidInput(
                "placeholder_patient_token cannot be empty".into(),
            ));
        }

        Ok(Self {
            id_strategy,
            placeholder_patient_token: IdToken::new(placeholder_patient_token)?,
        })
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.id_strategy
    }

    pub fn placeholder_patient_token(&self) -> &IdToken {
        &self.placeholder_patient_token
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::default(),
            placeholder_patient_token: IdToken::from_counter(DEFAULT_PLACEHOLDER_PATIENT_COUNTER),
        }
    }
}

/// Parse the identity strategy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default strategy (random UUIDs).
pub fn id_strategy_from_env_value(value: Option<String>) -> ConversionResult<IdStrategy> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<IdStrategy>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_env_value_selects_default_strategy() {
        assert_eq!(id_strategy_from_env_value(None).unwrap(), IdStrategy::Uuid);
        assert_eq!(
            id_strategy_from_env_value(Some("   ".into())).unwrap(),
            IdStrategy::Uuid
        );
    }

    #[test]
    fn env_value_is_trimmed_and_case_insensitive() {
        assert_eq!(
            id_strategy_from_env_value(Some(" Counter ".into())).unwrap(),
            IdStrategy::Counter
        );
    }

    #[test]
    fn unknown_env_value_is_rejected() {
        let err = id_strategy_from_env_value(Some("sequential".into()))
            .expect_err("should reject unknown strategy");
        match err {
            ConversionError::Uuid(e) => assert!(e.to_string().contains("sequential")),
            other => panic!("expected Uuid error, got {other:?}"),
        }
    }

    #[test]
    fn config_rejects_invalid_placeholder_token() {
        let err = CoreConfig::new(IdStrategy::Counter, " ").expect_err("blank token");
        assert!(matches!(err, ConversionError::InvalidInput(_)));
        assert!(CoreConfig::new(IdStrategy::Counter, "Patient/0").is_err());
    }

    #[test]
    fn default_config_uses_zero_placeholder() {
        let config = CoreConfig::default();
        assert_eq!(config.placeholder_patient_token().as_str(), "0");
        assert_eq!(config.id_strategy(), IdStrategy::Uuid);
    }
}
