//! Catalog and player repositories backed by the remote [`CatalogApi`].

use crate::cache::{CachePolicy, CacheService};
use crate::error::{AppError, Result};
use crate::models::MediaFile;
use crate::repositories::cache_aside::handle_cached_value;
use bridge_traits::catalog::CatalogApi;
use bridge_traits::time::Clock;
use core_auth::{AccessToken, TokenProvider};
use core_runtime::config::CacheSettings;
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use core_runtime::logging::{redact_if_sensitive, strip_path};
use std::sync::Arc;
use tracing::{debug, info, instrument};

const CATALOG_KEY: &str = "media";

/// Source of the track catalog.
#[async_trait::async_trait]
pub trait MediaRepository: Send + Sync {
    async fn list_media(&self, policy: CachePolicy) -> Result<Vec<MediaFile>>;
}

/// Resolves a track id into a playable URL.
#[async_trait::async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn url_from_id(&self, id: &str) -> Result<String>;
}

/// Repository over the remote catalog with in-memory caching of the listing
/// and of resolved download URLs.
pub struct RemoteMediaRepository {
    tokens: Arc<dyn TokenProvider>,
    api: Arc<dyn CatalogApi>,
    catalog_cache: CacheService<String, Vec<MediaFile>>,
    url_cache: CacheService<String, String>,
    catalog_policy: CachePolicy,
    url_policy: CachePolicy,
    event_bus: EventBus,
}

impl RemoteMediaRepository {
    /// Build the repository. Fails if either TTL in `settings` is zero.
    pub fn new(
        tokens: Arc<dyn TokenProvider>,
        api: Arc<dyn CatalogApi>,
        clock: Arc<dyn Clock>,
        settings: CacheSettings,
        event_bus: EventBus,
    ) -> Result<Self> {
        Ok(Self {
            tokens,
            api,
            catalog_cache: CacheService::with_clock(clock.clone()),
            url_cache: CacheService::with_clock(clock),
            catalog_policy: CachePolicy::cache_first(settings.catalog_ttl)?,
            url_policy: CachePolicy::cache_first(settings.url_ttl)?,
            event_bus,
        })
    }

    /// Drop every cached listing and URL, e.g. on sign-out.
    pub fn clear_cache(&self) {
        self.catalog_cache.clear();
        self.url_cache.clear();
        info!("Catalog cache cleared");
        let _ = self
            .event_bus
            .emit(CoreEvent::Library(LibraryEvent::CacheCleared));
    }

    async fn token(&self) -> Result<AccessToken> {
        Ok(self.tokens.access_token().await?)
    }

    /// Catalog listing fetched with an already obtained `token`.
    async fn catalog(&self, token: &AccessToken, policy: &CachePolicy) -> Result<Vec<MediaFile>> {
        let media = handle_cached_value(&self.catalog_cache, CATALOG_KEY.to_string(), policy, || async {
            let remote = self.api.list_media(token.secret()).await?;
            Ok::<_, AppError>(remote.into_iter().map(MediaFile::from).collect::<Vec<_>>())
        })
        .await?;

        debug!(count = media.len(), "Catalog loaded");
        let _ = self
            .event_bus
            .emit(CoreEvent::Library(LibraryEvent::CatalogLoaded { count: media.len() }));

        Ok(media)
    }
}

#[async_trait::async_trait]
impl MediaRepository for RemoteMediaRepository {
    #[instrument(skip(self))]
    async fn list_media(&self, policy: CachePolicy) -> Result<Vec<MediaFile>> {
        let token = self.token().await?;
        self.catalog(&token, &policy).await
    }
}

#[async_trait::async_trait]
impl PlayerRepository for RemoteMediaRepository {
    #[instrument(skip(self))]
    async fn url_from_id(&self, id: &str) -> Result<String> {
        let token = self.token().await?;

        let media = self.catalog(&token, &self.catalog_policy).await?;
        let file = media
            .into_iter()
            .find(|file| file.id == id)
            .ok_or_else(|| AppError::FileNotFound(id.to_string()))?;

        debug!(file = strip_path(&file.path), "Resolving download URL");
        let url = handle_cached_value(&self.url_cache, id.to_string(), &self.url_policy, || {
            self.api.download_url(token.secret(), &file.path)
        })
        .await?;

        debug!(url = %redact_if_sensitive("url", &url), "Download URL ready");
        Ok(url)
    }
}
