use bridge_traits::error::BridgeError;
use core_auth::AuthError;
use thiserror::Error;

/// Failures surfaced by the repository layer.
///
/// Transport and auth errors are folded into these variants once, at the
/// repository boundary; callers above it only ever see an `AppError`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("{0}")]
    Generic(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Generic(err.to_string())
    }
}

impl From<BridgeError> for AppError {
    fn from(err: BridgeError) -> Self {
        AppError::Generic(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_become_generic() {
        let err: AppError = AuthError::NotAuthenticated.into();
        assert!(matches!(err, AppError::Generic(_)));
    }

    #[test]
    fn bridge_not_found_is_still_generic() {
        // Only a missing catalog id is a FileNotFound; transport misses are not.
        let err: AppError = BridgeError::NotFound("tracks/x.mp3".into()).into();
        assert!(matches!(err, AppError::Generic(message) if message.contains("tracks/x.mp3")));
    }
}
