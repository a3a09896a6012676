use std::fmt;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("route calculation failed: {message}")]
    RoutingFailed { message: String },
    #[error("not ready to route: {0}")]
    NotReady(NotReadyReason),
    #[error("selection is full: at most {limit} addresses can be selected")]
    SelectionFull { limit: usize },
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn routing_failed(message: impl Into<String>) -> Self {
        Self::RoutingFailed {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady(_))
    }
}

/// Why a route calculation was refused before any router call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NotReadyReason {
    TooFewStops { selected: usize },
    GeocodingErrors { failed: usize },
    StillGeocoding { pending: usize },
}

impl fmt::Display for NotReadyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewStops { selected } => write!(
                f,
                "please select at least 2 addresses for routing ({selected} selected)"
            ),
            Self::GeocodingErrors { failed } => write!(
                f,
                "{failed} address(es) could not be geocoded; review or deselect them"
            ),
            Self::StillGeocoding { pending } => write!(
                f,
                "{pending} address(es) are still being geocoded; try again in a moment"
            ),
        }
    }
}

impl From<NotReadyReason> for Error {
    fn from(reason: NotReadyReason) -> Self {
        Self::NotReady(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, NotReadyReason};

    #[test]
    fn not_ready_messages_name_the_blocking_condition() {
        let err = Error::from(NotReadyReason::StillGeocoding { pending: 2 });
        assert!(err.is_not_ready());
        assert!(err.to_string().contains("still being geocoded"));

        let err = Error::from(NotReadyReason::TooFewStops { selected: 1 });
        assert!(err.to_string().contains("at least 2"));
    }

    #[test]
    fn routing_failed_carries_upstream_message() {
        let err = Error::routing_failed("NoRoute: impossible route");
        assert_eq!(
            err.to_string(),
            "route calculation failed: NoRoute: impossible route"
        );
        assert!(!err.is_not_ready());
    }
}
