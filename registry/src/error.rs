use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// One broken field rule. `field` carries the wire-facing camelCase name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Caller input broke one or more field rules; carries the full list.
    #[error("validation failed")]
    Validation(Vec<Violation>),
    /// Unexpected failure while talking to the store. The source is kept
    /// for logging and never surfaces to callers.
    #[error("{message}")]
    Service {
        message: &'static str,
        #[source]
        source: DbErr,
    },
}

impl RegistryError {
    pub fn service(message: &'static str, source: DbErr) -> Self {
        Self::Service { message, source }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
