//! Errors and error specific types for universal use

/// Custom Result
/// A custom datatype that wraps the error variant <E> into a report, allowing
/// error_stack::Report<E> specific extendability
///
/// Effectively, equivalent to `Result<T, error_stack::Report<E>>`
pub type CustomResult<T, E> = error_stack::Result<T, E>;

/// Settings could not be loaded or hold unusable values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Failed to load the configuration")]
    ConfigLoadFailed,
    #[error("Invalid configuration value: {0}")]
    InvalidConfigurationValue(String),
}

/// Failures while building the payment form. All of them point at configuration problems of the
/// vendor or the host application, never at missing optional order data.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Failed to build a return URL from the vendor host")]
    InvalidReturnUrl,
    #[error("No merchant signing key configured for the vendor")]
    MissingSigningKey,
    #[error("Failed to format the {field_name} date")]
    DateFormattingFailed { field_name: &'static str },
    #[error("Failed to encode the order items")]
    OrderItemsEncodingFailed,
    #[error("Failed to generate the form signature")]
    SignatureGenerationFailed,
    #[error("Failed to look up the order condition")]
    OrderConditionLookupFailed,
    #[error("Failed to mark the order condition as used")]
    OrderConditionUpdateFailed,
}

/// Cryptograpic algorithm errors
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The cryptographic algorithm was unable to sign the message
    #[error("Failed to sign message")]
    MessageSigningFailed,
    /// The cryptographic algorithm was unable to verify the given signature
    #[error("Failed to verify signature")]
    SignatureVerificationFailed,
}

/// The response body could not be turned into a generic mapping.
#[derive(Debug, thiserror::Error)]
#[error("Failed to parse the response body")]
pub struct ParsingError;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum OpenApiError {
    #[error("Failed to construct the HTTP client")]
    ClientConstructionFailed,
    #[error("Failed to build the request URL")]
    UrlParsingFailed,
    #[error("Request timed out")]
    RequestTimeoutReceived,
    #[error("Failed to send the request: {0}")]
    RequestNotSent(String),
    #[error("Failed to read the response body")]
    ResponseBodyReadFailed,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("[{status_code}]: {body}")]
    ErrorResponse { status_code: u16, body: String },
    #[error("Unknown response content_type {0}")]
    UnknownContentType(String),
    #[error("Failed to deserialize the response body")]
    ResponseDeserializationFailed,
}

impl OpenApiError {
    /// Failures the balance call swallows and reports as "no data".
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::RequestTimeoutReceived
                | Self::RequestNotSent(_)
                | Self::ResponseBodyReadFailed
                | Self::Unauthorized
        )
    }

    /// Whether the failure is worth a telemetry report. Timeouts and rejected tokens are routine.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Self::RequestTimeoutReceived | Self::Unauthorized)
    }
}
