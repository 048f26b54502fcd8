#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("source document error: {0}")]
    Cda(#[from] cda::CdaError),
    #[error("target model error: {0}")]
    Fhir(#[from] fhir::FhirError),
    #[error("identity error: {0}")]
    Uuid(#[from] cda2fhir_uuid::UuidError),
    #[error("document is absent (null-flavored) and produced no resources")]
    MissingDocument,
}

pub type ConversionResult<T> = std::result::Result<T, ConversionError>;
