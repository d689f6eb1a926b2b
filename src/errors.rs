use std::error::Error;

type BoxError = Box<dyn Error + Send + Sync + 'static>;

#[derive(thiserror::Error, Debug)]
pub enum ConnectorError {
    #[error("Invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    /// Raised by the credential manager, rendered exactly as it was raised
    #[error("{0}")]
    Credential(BoxError),
    /// Raised by a third-party engine factory, rendered exactly as it was raised
    #[error("{0}")]
    Engine(BoxError),
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;

impl ConnectorError {
    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        ConnectorError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub fn credential<E: Error + Send + Sync + 'static>(error: E) -> Self {
        ConnectorError::Credential(Box::new(error))
    }

    pub fn engine<E: Error + Send + Sync + 'static>(error: E) -> Self {
        ConnectorError::Engine(Box::new(error))
    }

    /// Borrow the credential manager's original error, if that is what this is
    pub fn credential_error<E: Error + 'static>(&self) -> Option<&E> {
        match self {
            ConnectorError::Credential(inner) => inner.downcast_ref(),
            _ => None,
        }
    }

    /// Take back the credential manager's original error
    ///
    /// Returns `self` unchanged if it is not a credential error of type `E`.
    pub fn into_credential<E: Error + 'static>(self) -> Result<E, Self> {
        match self {
            ConnectorError::Credential(inner) => match inner.downcast::<E>() {
                Ok(original) => Ok(*original),
                Err(inner) => Err(ConnectorError::Credential(inner)),
            },
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(thiserror::Error, Debug, PartialEq)]
    #[error("{0}")]
    struct SdkError(String);

    #[test]
    fn credential_errors_keep_their_message() {
        let message = "This message depends on the SDK, this is just an example.";
        let err = ConnectorError::credential(SdkError(message.into()));
        assert_eq!(err.to_string(), message);
        assert_eq!(err.credential_error::<SdkError>(), Some(&SdkError(message.into())));
        assert_eq!(err.into_credential::<SdkError>().ok(), Some(SdkError(message.into())));
    }

    #[test]
    fn into_credential_leaves_other_errors_alone() {
        let err = ConnectorError::invalid_config("hostname", "missing");
        assert!(err.credential_error::<SdkError>().is_none());
        assert!(matches!(
            err.into_credential::<SdkError>(),
            Err(ConnectorError::InvalidConfig { field: "hostname", .. })
        ));
    }
}
