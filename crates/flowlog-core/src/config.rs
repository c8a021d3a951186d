//! Logger configuration.
//!
//! With the `config` feature, settings can also be read from `FLOWLOG_*`
//! environment variables and `.env` files:
//!
//! ```ignore
//! use flowlog_core::config::{load_dotenv, LoggerConfig};
//!
//! load_dotenv();
//! let config = LoggerConfig::from_env()?;
//! ```

use crate::fields::FieldNames;

/// Default variable holding the environment name
pub const DEFAULT_ENVIRONMENT_VAR: &str = "FLOW_ENV";

/// Where the environment name of each record comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvironmentSource {
    /// A fixed name
    Fixed(String),
    /// A process environment variable, read for every record
    Variable(String),
}

impl EnvironmentSource {
    /// Current environment name, empty when unavailable
    pub fn resolve(&self) -> String {
        match self {
            EnvironmentSource::Fixed(name) => name.clone(),
            EnvironmentSource::Variable(var) => std::env::var(var).unwrap_or_default(),
        }
    }
}

impl Default for EnvironmentSource {
    fn default() -> Self {
        EnvironmentSource::Variable(DEFAULT_ENVIRONMENT_VAR.to_string())
    }
}

/// Logger configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Application name used when the host does not report one
    pub application: Option<String>,
    /// Source of the environment name
    pub environment: EnvironmentSource,
    /// Reserved field names
    pub fields: FieldNames,
    /// Whether an inbound request re-anchors the service start time
    pub reset_service_start_on_request_in: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            application: None,
            environment: EnvironmentSource::default(),
            fields: FieldNames::default(),
            reset_service_start_on_request_in: true,
        }
    }
}

impl LoggerConfig {
    /// Create a new builder for LoggerConfig
    pub fn builder() -> LoggerConfigBuilder {
        LoggerConfigBuilder::default()
    }
}

/// Builder for LoggerConfig
#[derive(Default)]
pub struct LoggerConfigBuilder {
    config: LoggerConfig,
}

impl LoggerConfigBuilder {
    /// Set the fallback application name
    pub fn application(mut self, name: impl Into<String>) -> Self {
        self.config.application = Some(name.into());
        self
    }

    /// Use a fixed environment name
    pub fn environment(mut self, name: impl Into<String>) -> Self {
        self.config.environment = EnvironmentSource::Fixed(name.into());
        self
    }

    /// Read the environment name from a process variable
    pub fn environment_var(mut self, var: impl Into<String>) -> Self {
        self.config.environment = EnvironmentSource::Variable(var.into());
        self
    }

    /// Set the reserved field names
    pub fn fields(mut self, fields: FieldNames) -> Self {
        self.config.fields = fields;
        self
    }

    /// Set whether an inbound request re-anchors the service start time
    pub fn reset_service_start_on_request_in(mut self, reset: bool) -> Self {
        self.config.reset_service_start_on_request_in = reset;
        self
    }

    /// Build the configuration
    pub fn build(self) -> LoggerConfig {
        self.config
    }
}

#[cfg(feature = "config")]
mod env {
    use super::{EnvironmentSource, LoggerConfig};
    use crate::error::Result;
    use crate::fields::FieldNames;
    use serde::Deserialize;

    /// Prefix of the configuration variables
    pub const ENV_PREFIX: &str = "FLOWLOG_";

    #[derive(Debug, Default, Deserialize)]
    struct EnvSettings {
        application: Option<String>,
        environment: Option<String>,
        environment_var: Option<String>,
        reset_service_start_on_request_in: Option<bool>,
        correlation_id_field: Option<String>,
        message_id_field: Option<String>,
        start_time_field: Option<String>,
        downstream_start_time_field: Option<String>,
        flow_start_time_field: Option<String>,
        transaction_id_field: Option<String>,
        nested_bag_field: Option<String>,
    }

    impl LoggerConfig {
        /// Load configuration from `FLOWLOG_*` environment variables.
        ///
        /// Unset variables keep their defaults. `FLOWLOG_ENVIRONMENT` fixes
        /// the environment name and wins over `FLOWLOG_ENVIRONMENT_VAR`.
        ///
        /// # Errors
        ///
        /// Returns an error if a variable cannot be deserialized, e.g. a
        /// non-boolean `FLOWLOG_RESET_SERVICE_START_ON_REQUEST_IN`.
        pub fn from_env() -> Result<Self> {
            let settings: EnvSettings = envy::prefixed(ENV_PREFIX).from_env()?;
            Ok(settings.into_config())
        }
    }

    impl EnvSettings {
        fn into_config(self) -> LoggerConfig {
            let defaults = LoggerConfig::default();
            let base = FieldNames::default();

            let environment = match (self.environment, self.environment_var) {
                (Some(name), _) => EnvironmentSource::Fixed(name),
                (None, Some(var)) => EnvironmentSource::Variable(var),
                (None, None) => defaults.environment,
            };

            LoggerConfig {
                application: self.application,
                environment,
                fields: FieldNames {
                    correlation_id: self.correlation_id_field.unwrap_or(base.correlation_id),
                    message_id: self.message_id_field.unwrap_or(base.message_id),
                    start_time: self.start_time_field.unwrap_or(base.start_time),
                    downstream_start_time: self
                        .downstream_start_time_field
                        .unwrap_or(base.downstream_start_time),
                    flow_start_time: self.flow_start_time_field.unwrap_or(base.flow_start_time),
                    transaction_id: self.transaction_id_field.unwrap_or(base.transaction_id),
                    nested_bag: self.nested_bag_field.unwrap_or(base.nested_bag),
                },
                reset_service_start_on_request_in: self
                    .reset_service_start_on_request_in
                    .unwrap_or(defaults.reset_service_start_on_request_in),
            }
        }
    }

    /// Load environment variables from a `.env` file in the current
    /// directory. A missing file is not an error; existing variables win.
    pub fn load_dotenv() {
        let _ = dotenvy::dotenv();
    }

    /// Load environment variables from a specific file path.
    pub fn load_dotenv_from<P: AsRef<std::path::Path>>(path: P) {
        let _ = dotenvy::from_path(path);
    }
}

#[cfg(feature = "config")]
pub use env::{load_dotenv, load_dotenv_from, ENV_PREFIX};
