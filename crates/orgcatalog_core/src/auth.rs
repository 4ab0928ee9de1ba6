//! Caller credential check.
//!
//! The request layer asks a [`CredentialVerifier`] before running any query.

use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingCredential,
    InvalidCredential,
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "missing API key"),
            Self::InvalidCredential => write!(f, "invalid API key"),
        }
    }
}

impl Error for AuthError {}

pub trait CredentialVerifier {
    fn verify(&self, presented: Option<&str>) -> Result<(), AuthError>;
}

/// Accepts exactly one shared API key.
#[derive(Debug, Clone)]
pub struct ApiKeyVerifier {
    expected: String,
}

impl ApiKeyVerifier {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl CredentialVerifier for ApiKeyVerifier {
    fn verify(&self, presented: Option<&str>) -> Result<(), AuthError> {
        let result = match presented {
            None => Err(AuthError::MissingCredential),
            Some(key) if key == self.expected => Ok(()),
            Some(_) => Err(AuthError::InvalidCredential),
        };
        if let Err(err) = &result {
            // Never log the presented key itself.
            warn!("event=auth_check module=auth status=error reason={err:?}");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiKeyVerifier, AuthError, CredentialVerifier};

    #[test]
    fn matching_key_passes() {
        let verifier = ApiKeyVerifier::new("supersecret");
        assert_eq!(verifier.verify(Some("supersecret")), Ok(()));
    }

    #[test]
    fn missing_and_wrong_keys_are_rejected() {
        let verifier = ApiKeyVerifier::new("supersecret");
        assert_eq!(verifier.verify(None), Err(AuthError::MissingCredential));
        assert_eq!(
            verifier.verify(Some("SUPERSECRET")),
            Err(AuthError::InvalidCredential)
        );
        assert_eq!(verifier.verify(Some("")), Err(AuthError::InvalidCredential));
    }
}
