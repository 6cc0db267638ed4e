//! Error kinds, split by when they can happen.
//!
//! [`ScrapeError`] and [`FieldError`] are contained within a single scrape and
//! only ever end up in the logs. [`ConfigError`] and [`StartupError`] abort the
//! process before it starts serving.

use thiserror::Error;

use crate::collector::BeanField;

/// Failure of one fetch/parse cycle. The gauges keep their previous values.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed JMX document: {0}")]
    Malformed(#[from] DocumentError),
}

impl ScrapeError {
    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Transport { .. } => "transport",
            ScrapeError::Status { .. } => "status",
            ScrapeError::Malformed(_) => "malformed",
        }
    }
}

/// The JMX document does not have the `{"beans": [...]}` shape.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("document root is not an object")]
    NotAnObject,

    #[error("document has no \"beans\" key")]
    MissingBeans,

    #[error("\"beans\" is not a list")]
    BeansNotAList,
}

/// A single attribute of the FSNamesystem bean could not be read.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("{0} is missing")]
    Missing(BeanField),

    #[error("{field} is not a number (found {found})")]
    NotNumeric {
        field: BeanField,
        found: &'static str,
    },
}

impl FieldError {
    pub fn field(&self) -> BeanField {
        match self {
            FieldError::Missing(field) => *field,
            FieldError::NotNumeric { field, .. } => *field,
        }
    }
}

/// Invalid configuration, detected while loading it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("configuration file {0} does not exist")]
    MissingFile(String),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Load(Box::new(e))
    }
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Fatal errors raised before or while the server is running.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("could not register collector: {0}")]
    Registry(#[from] prometheus::Error),

    #[error("could not bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
