//!
//! Client of the WalletOne Open API.
//!

pub mod transformers;

use error_stack::{report, Report, ResultExt};
use masking::{PeekInterface, Secret};
use router_env::{instrument, logger};
use serde_json::Value;

use self::transformers::BodyFormat;
use crate::{
    configs::OpenApiSettings,
    consts::{headers, OPEN_API_MEDIA_TYPE},
    entities::BalanceResponse,
    errors::{CustomResult, OpenApiError},
    telemetry::{ErrorNotifier, LoggingNotifier},
};

/// Authenticated client of the Open API.
///
/// Every call is a single GET without retries. Timeouts, transport failures and rejected tokens
/// come back as `Ok(None)`: callers cannot tell "no balance" from "network blip". Unexpected
/// statuses and unknown content types are errors. Both the latter and any transport failure
/// other than a timeout are handed to the [`ErrorNotifier`].
pub struct OpenApiClient<N = LoggingNotifier> {
    client: reqwest::Client,
    base_url: url::Url,
    token: Secret<String>,
    notifier: N,
}

impl<N> std::fmt::Debug for OpenApiClient<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl OpenApiClient {
    pub fn new(
        settings: &OpenApiSettings,
        token: Secret<String>,
    ) -> CustomResult<Self, OpenApiError> {
        Self::with_notifier(settings, token, LoggingNotifier)
    }
}

impl<N> OpenApiClient<N>
where
    N: ErrorNotifier,
{
    pub fn with_notifier(
        settings: &OpenApiSettings,
        token: Secret<String>,
        notifier: N,
    ) -> CustomResult<Self, OpenApiError> {
        let base_url = url::Url::parse(&settings.base_url)
            .change_context(OpenApiError::UrlParsingFailed)
            .attach_printable_lazy(|| format!("Invalid Open API base URL {}", settings.base_url))?;
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .change_context(OpenApiError::ClientConstructionFailed)?;

        Ok(Self {
            client,
            base_url,
            token,
            notifier,
        })
    }

    /// Balance of every currency of the wallet, or of `currency_id` (ISO 4217 numeric) only.
    #[instrument(skip_all, fields(currency_id = ?currency_id))]
    pub async fn get_balance(
        &self,
        currency_id: Option<u16>,
    ) -> CustomResult<Option<BalanceResponse>, OpenApiError> {
        let path = match currency_id {
            Some(currency_id) => format!("balance/{currency_id}"),
            None => "balance".to_string(),
        };

        match self.get(&path).await {
            Ok(payload) => Ok(Some(self.prepare_entity(payload))),
            Err(report) => self.recover(report),
        }
    }

    async fn get(&self, path: &str) -> CustomResult<Value, OpenApiError> {
        let url = self
            .base_url
            .join(path)
            .change_context(OpenApiError::UrlParsingFailed)
            .attach_printable_lazy(|| format!("Unable to join {path} onto the base URL"))?;

        logger::debug!(%url, "Sending Open API request");
        let response = self
            .client
            .get(url)
            .header(headers::ACCEPT, OPEN_API_MEDIA_TYPE)
            .header(headers::CONTENT_TYPE, OPEN_API_MEDIA_TYPE)
            .bearer_auth(self.token.peek())
            .send()
            .await
            .map_err(|error| match error {
                error if error.is_timeout() => OpenApiError::RequestTimeoutReceived,
                _ => OpenApiError::RequestNotSent(error.to_string()),
            })
            .attach_printable("Unable to send request to the Open API")?;

        let status_code = response.status().as_u16();
        logger::debug!(status_code, "Open API response received");

        match status_code {
            200 => {
                let content_type = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let body = response
                    .text()
                    .await
                    .map_err(|error| match error {
                        error if error.is_timeout() => OpenApiError::RequestTimeoutReceived,
                        _ => OpenApiError::ResponseBodyReadFailed,
                    })
                    .attach_printable("Unable to read the Open API response body")?;
                self.parse_response(&content_type, &body)
            }
            401 => Err(report!(OpenApiError::Unauthorized)),
            _ => {
                // An unreadable error body is left empty.
                let body = response.text().await.unwrap_or_default();
                Err(report!(OpenApiError::ErrorResponse { status_code, body }))
            }
        }
    }

    /// Decodes a successful body. A body that does not parse is reported and read as `{}`.
    fn parse_response(&self, content_type: &str, body: &str) -> CustomResult<Value, OpenApiError> {
        let format = BodyFormat::from_content_type(content_type).ok_or_else(|| {
            report!(OpenApiError::UnknownContentType(content_type.to_string()))
        })?;

        match format.parse(body) {
            Ok(value) => Ok(value),
            Err(error) => {
                let report = error
                    .change_context(OpenApiError::ResponseDeserializationFailed)
                    .attach_printable(format!("content_type: {content_type}, body: {body}"));
                self.notifier.notify(&report);
                Ok(Value::Object(serde_json::Map::new()))
            }
        }
    }

    fn prepare_entity(&self, payload: Value) -> BalanceResponse {
        BalanceResponse::from_value(payload).unwrap_or_else(|error| {
            let report = Report::new(error)
                .change_context(OpenApiError::ResponseDeserializationFailed)
                .attach_printable("Payload does not match the balance entity");
            self.notifier.notify(&report);
            BalanceResponse::default()
        })
    }

    fn recover<T>(&self, report: Report<OpenApiError>) -> CustomResult<Option<T>, OpenApiError> {
        let error = report.current_context();
        if error.is_reportable() {
            self.notifier.notify(&report);
        }
        if error.is_recoverable() {
            logger::warn!(error = %error, "Open API call returned no data");
            Ok(None)
        } else {
            Err(report)
        }
    }
}
