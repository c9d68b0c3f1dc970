use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    #[error("Token source rejected the credentials: {0}")]
    Rejected(String),

    #[error("Not authenticated")]
    NotAuthenticated,
}

impl From<BridgeError> for AuthError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Unauthorized(reason) => AuthError::Rejected(reason),
            other => AuthError::TokenRefreshFailed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
