use std::{path::PathBuf, time::Duration};

use config::{Environment, File};
use error_stack::{report, ResultExt};
use masking::Secret;
use router_env::{config::Log, env, logger, Env};
use serde::Deserialize;

use crate::{
    consts,
    crypto::SignatureAlgorithm,
    errors::{ConfigurationError, CustomResult},
};

/// Prefix of environment variables overriding file settings, e.g. `W1__OPEN_API__TIMEOUT_MS`.
pub const ENV_PREFIX: &str = "W1";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub log: Log,
    pub form: FormSettings,
    pub open_api: OpenApiSettings,
}

/// When the form asks the gateway to dispatch a delivery.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Never send delivery fields.
    #[default]
    Disabled,
    /// Send them for gateway managed deliveries of orders with an "on create" condition.
    OrderCondition,
    /// Send them for every order with delivery details.
    Forced,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FormSettings {
    /// Path of the vendor storefront the gateway redirects to after a successful payment.
    pub success_path: String,
    pub failure_path: String,
    pub delivery_policy: DeliveryPolicy,
    pub signature_algorithm: SignatureAlgorithm,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            success_path: "/vendor/payments/w1/success".into(),
            failure_path: "/vendor/payments/w1/failure".into(),
            delivery_policy: DeliveryPolicy::default(),
            signature_algorithm: SignatureAlgorithm::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OpenApiSettings {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Bearer token of the merchant wallet, usually set through `W1__OPEN_API__API_TOKEN`.
    pub api_token: Option<Secret<String>>,
}

impl Default for OpenApiSettings {
    fn default() -> Self {
        Self {
            base_url: consts::OPEN_API_BASE_URL.into(),
            timeout_ms: consts::OPEN_API_TIMEOUT_MS,
            api_token: None,
        }
    }
}

impl OpenApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Settings {
    /// Settings of the environment named by `RUN_ENV`, read from `config/<env>.toml` under the
    /// workspace root.
    pub fn new() -> CustomResult<Self, ConfigurationError> {
        Self::with_config_path(env::which(), None)
    }

    /// Reads `<config_path>/<env>.toml` when it exists, then `W1__*` environment variables on top.
    pub fn with_config_path(
        environment: Env,
        config_path: Option<PathBuf>,
    ) -> CustomResult<Self, ConfigurationError> {
        let config_path = config_path.unwrap_or_else(|| env::workspace_path().join("config"));
        let config_file = config_path.join(format!("{}.toml", environment.config_file_stem()));
        logger::debug!(config_file = %config_file.display(), "Loading settings");

        let settings: Self = config::Config::builder()
            .add_source(File::from(config_file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .separator(ENV_SEPARATOR),
            )
            .build()
            .change_context(ConfigurationError::ConfigLoadFailed)?
            .try_deserialize()
            .change_context(ConfigurationError::ConfigLoadFailed)
            .attach_printable("Unable to deserialize the settings")?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> CustomResult<(), ConfigurationError> {
        self.form.validate()?;
        self.open_api.validate()
    }
}

impl FormSettings {
    pub fn validate(&self) -> CustomResult<(), ConfigurationError> {
        for (name, path) in [
            ("form.success_path", &self.success_path),
            ("form.failure_path", &self.failure_path),
        ] {
            if !path.starts_with('/') {
                return Err(report!(ConfigurationError::InvalidConfigurationValue(
                    format!("{name} must be an absolute path")
                )));
            }
        }
        Ok(())
    }
}

impl OpenApiSettings {
    pub fn validate(&self) -> CustomResult<(), ConfigurationError> {
        let base_url = url::Url::parse(&self.base_url)
            .change_context(ConfigurationError::InvalidConfigurationValue(
                "open_api.base_url must be a valid URL".into(),
            ))?;
        if !base_url.path().ends_with('/') {
            return Err(report!(ConfigurationError::InvalidConfigurationValue(
                "open_api.base_url must end with a slash".into()
            )));
        }
        if self.timeout_ms == 0 {
            return Err(report!(ConfigurationError::InvalidConfigurationValue(
                "open_api.timeout_ms must not be zero".into()
            )));
        }
        Ok(())
    }
}
