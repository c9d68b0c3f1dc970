//! # Token Manager
//!
//! Keeps one access token for the catalog backend and refreshes it on demand.
//!
//! ## Overview
//!
//! [`TokenManager::access_token`] returns the cached token while it is more
//! than [`TOKEN_REFRESH_BUFFER_SECS`] away from expiring, and otherwise asks the
//! host [`TokenSource`] for a new one. The cache slot is a `tokio::sync::Mutex`
//! held across the fetch, so callers racing on an expired token wait for the
//! single refresh instead of each hitting the backend.
//!
//! ## Usage
//!
//! ```no_run
//! use core_auth::{AccessToken, TokenManager, TokenProvider, TokenSource};
//! use bridge_traits::SystemClock;
//! use core_runtime::events::EventBus;
//! use std::sync::Arc;
//!
//! struct AnonymousSignIn;
//!
//! #[async_trait::async_trait]
//! impl TokenSource for AnonymousSignIn {
//!     async fn fetch_token(&self) -> bridge_traits::error::Result<AccessToken> {
//!         Ok(AccessToken::new("anon"))
//!     }
//! }
//!
//! # async fn run() -> core_auth::Result<()> {
//! let manager = TokenManager::new(Arc::new(AnonymousSignIn), Arc::new(SystemClock), EventBus::default());
//! let token = manager.access_token().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::AccessToken;
use bridge_traits::time::Clock;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Refresh this many seconds before the reported expiry.
pub const TOKEN_REFRESH_BUFFER_SECS: i64 = 60;

/// Host-provided way of obtaining a fresh token.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> bridge_traits::error::Result<AccessToken>;
}

/// What repositories depend on: "give me a usable token or tell me why not".
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken>;
}

/// Caching, refresh-serializing [`TokenProvider`].
pub struct TokenManager {
    source: Arc<dyn TokenSource>,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    current: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(source: Arc<dyn TokenSource>, clock: Arc<dyn Clock>, event_bus: EventBus) -> Self {
        Self {
            source,
            clock,
            event_bus,
            current: Mutex::new(None),
        }
    }

    /// Forget the current token; the next call fetches a new one.
    pub async fn invalidate(&self) {
        debug!("Invalidating cached access token");
        self.current.lock().await.take();
    }

    async fn refresh(&self) -> Result<AccessToken> {
        let _ = self
            .event_bus
            .emit(CoreEvent::Auth(AuthEvent::TokenRefreshing));

        match self.source.fetch_token().await {
            Ok(token) => {
                info!(expires_at = ?token.expires_at(), "Access token refreshed");
                let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::TokenRefreshed {
                    expires_at: token.expires_at().map(|at| at.timestamp()),
                }));
                Ok(token)
            }
            Err(err) => {
                let err = AuthError::from(err);
                warn!(error = %err, "Access token refresh failed");
                let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::AuthError {
                    message: err.to_string(),
                }));
                Err(err)
            }
        }
    }
}

#[async_trait::async_trait]
impl TokenProvider for TokenManager {
    #[instrument(skip(self))]
    async fn access_token(&self) -> Result<AccessToken> {
        let mut current = self.current.lock().await;

        if let Some(token) = current.as_ref() {
            let buffer = chrono::Duration::seconds(TOKEN_REFRESH_BUFFER_SECS);
            if !token.is_expired_at(self.clock.now(), buffer) {
                return Ok(token.clone());
            }
            debug!("Access token expiring, refreshing");
        }

        // A failed refresh leaves no token behind; the next caller retries the source.
        current.take();
        let token = self.refresh().await?;
        *current = Some(token.clone());
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{BridgeError, ManualClock};
    use mockall::mock;
    use std::time::Duration;

    mock! {
        Source {}

        #[async_trait::async_trait]
        impl TokenSource for Source {
            async fn fetch_token(&self) -> bridge_traits::error::Result<AccessToken>;
        }
    }

    fn manager(source: MockSource, clock: Arc<ManualClock>) -> TokenManager {
        TokenManager::new(Arc::new(source), clock, EventBus::new(16))
    }

    #[tokio::test]
    async fn test_token_is_cached_until_near_expiry() {
        let clock = Arc::new(ManualClock::new());
        let expires_at = clock.now() + chrono::Duration::minutes(5);

        let mut source = MockSource::new();
        source
            .expect_fetch_token()
            .times(2)
            .returning(move || Ok(AccessToken::new("t").expiring_at(expires_at)));

        let manager = manager(source, clock.clone());
        manager.access_token().await.unwrap();
        manager.access_token().await.unwrap();

        // Inside the refresh buffer: must refetch.
        clock.advance(Duration::from_secs(4 * 60 + 30));
        manager.access_token().await.unwrap();
    }

    #[tokio::test]
    async fn test_source_failure_maps_to_auth_error() {
        let mut source = MockSource::new();
        source
            .expect_fetch_token()
            .times(1)
            .returning(|| Err(BridgeError::Unauthorized("revoked".into())));

        let manager = manager(source, Arc::new(ManualClock::new()));
        let err = manager.access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(reason) if reason == "revoked"));
    }

    #[tokio::test]
    async fn test_refresh_events_are_published() {
        let mut source = MockSource::new();
        source
            .expect_fetch_token()
            .returning(|| Ok(AccessToken::new("t")));

        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let manager = TokenManager::new(Arc::new(source), Arc::new(ManualClock::new()), bus);

        manager.access_token().await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), CoreEvent::Auth(AuthEvent::TokenRefreshing));
        assert_eq!(
            rx.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::TokenRefreshed { expires_at: None })
        );
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let mut source = MockSource::new();
        source
            .expect_fetch_token()
            .times(2)
            .returning(|| Ok(AccessToken::new("t")));

        let manager = manager(source, Arc::new(ManualClock::new()));
        manager.access_token().await.unwrap();
        manager.invalidate().await;
        manager.access_token().await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let mut source = MockSource::new();
        source
            .expect_fetch_token()
            .times(1)
            .returning(|| Ok(AccessToken::new("shared")));

        let manager = Arc::new(manager(source, Arc::new(ManualClock::new())));
        let (a, b) = tokio::join!(manager.access_token(), manager.access_token());

        assert_eq!(a.unwrap().secret(), "shared");
        assert_eq!(b.unwrap().secret(), "shared");
    }
}
