use thiserror::Error;

use crate::config::ConfigError;
use crate::document::DocumentError;
use crate::engine::units::UnknownUnit;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("estimate uses units outside the conversion table: {}", describe_units(.0))]
    UnknownUnits(Vec<UnknownUnit>),
    #[error("invalid estimate: {0}")]
    InvalidEstimate(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

fn describe_units(units: &[UnknownUnit]) -> String {
    units
        .iter()
        .map(|unit| format!("line {} `{}` ({})", unit.line_index + 1, unit.item_name, unit.unit))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("input failure: {0}")]
    Input(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("document failure: {0}")]
    Document(String),
    #[error("runtime failure: {0}")]
    Runtime(String),
}

impl From<ConfigError> for ApplicationError {
    fn from(error: ConfigError) -> Self {
        Self::Configuration(error.to_string())
    }
}

impl From<DocumentError> for ApplicationError {
    fn from(error: DocumentError) -> Self {
        Self::Document(error.to_string())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "The estimate could not be priced. Check inputs and try again.",
            Self::NotFound { .. } => "The requested client job or estimate does not exist.",
            Self::ServiceUnavailable { .. } => {
                "The record store is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Domain(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id }
            }
            ApplicationError::Input(message) => Self::BadRequest { message, correlation_id },
            ApplicationError::NotFound(message) => Self::NotFound { message, correlation_id },
            ApplicationError::Persistence(message) => {
                Self::ServiceUnavailable { message, correlation_id }
            }
            ApplicationError::Configuration(message)
            | ApplicationError::Document(message)
            | ApplicationError::Runtime(message) => Self::Internal { message, correlation_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ConfigError;
    use crate::engine::units::UnknownUnit;
    use crate::errors::{ApplicationError, DomainError, InterfaceError};

    #[test]
    fn domain_error_maps_to_bad_request_interface_error() {
        let interface = ApplicationError::from(DomainError::InvariantViolation(
            "grand total below raw total".to_owned(),
        ))
        .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
        assert_eq!(
            interface.user_message(),
            "The estimate could not be priced. Check inputs and try again."
        );
    }

    #[test]
    fn unknown_units_name_the_offending_lines() {
        let error = DomainError::UnknownUnits(vec![UnknownUnit {
            line_index: 2,
            item_name: "Sand".to_owned(),
            unit: "bag".to_owned(),
        }]);

        assert_eq!(
            error.to_string(),
            "estimate uses units outside the conversion table: line 3 `Sand` (bag)"
        );
    }

    #[test]
    fn persistence_error_maps_to_service_unavailable() {
        let interface = ApplicationError::Persistence("database lock timeout".to_owned())
            .into_interface("req-3");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(
            interface.user_message(),
            "The record store is temporarily unavailable. Please retry shortly."
        );
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface = ApplicationError::Configuration("negative daily rate".to_owned())
            .into_interface("req-4");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }

    #[test]
    fn missing_records_map_to_not_found() {
        let interface = ApplicationError::NotFound("no client job `C-9`".to_owned())
            .into_interface("req-5");

        assert!(matches!(interface, InterfaceError::NotFound { .. }));
        assert_eq!(interface.correlation_id(), "req-5");
        assert_eq!(interface.to_string(), "not found: no client job `C-9`");
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let interface =
            ApplicationError::from(DomainError::InvalidEstimate("items must be a list".to_owned()))
                .into_interface("req-6");

        assert_eq!(interface.to_string(), "bad request: invalid estimate: items must be a list");
        assert!(matches!(
            ApplicationError::Input("unreadable file".to_owned()).into_interface("req-7"),
            InterfaceError::BadRequest { .. }
        ));
    }

    #[test]
    fn config_errors_convert_into_the_configuration_layer() {
        let error = ApplicationError::from(ConfigError::UnterminatedInterpolation);
        assert!(matches!(error, ApplicationError::Configuration(_)));
    }
}
