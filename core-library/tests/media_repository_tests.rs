use bridge_traits::catalog::{CatalogApi, RemoteMediaFile};
use bridge_traits::{BridgeError, ManualClock};
use core_auth::{AccessToken, AuthError, TokenProvider};
use core_library::{AppError, CachePolicy, MediaRepository, PlayerRepository, RemoteMediaRepository};
use core_runtime::config::CacheSettings;
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;

mock! {
    Catalog {}

    #[async_trait::async_trait]
    impl CatalogApi for Catalog {
        async fn list_media(&self, token: &str) -> bridge_traits::error::Result<Vec<RemoteMediaFile>>;
        async fn download_url(&self, token: &str, path: &str) -> bridge_traits::error::Result<String>;
    }
}

mock! {
    Tokens {}

    #[async_trait::async_trait]
    impl TokenProvider for Tokens {
        async fn access_token(&self) -> core_auth::Result<AccessToken>;
    }
}

fn remote(id: &str) -> RemoteMediaFile {
    RemoteMediaFile {
        id: id.to_string(),
        name: format!("Track {id}"),
        description: String::new(),
        path: format!("tracks/{id}.mp3"),
    }
}

fn valid_tokens() -> MockTokens {
    let mut tokens = MockTokens::new();
    tokens
        .expect_access_token()
        .returning(|| Ok(AccessToken::new("bearer")));
    tokens
}

fn repository(tokens: MockTokens, catalog: MockCatalog, clock: Arc<ManualClock>) -> RemoteMediaRepository {
    RemoteMediaRepository::new(
        Arc::new(tokens),
        Arc::new(catalog),
        clock,
        CacheSettings::default(),
        EventBus::new(16),
    )
    .unwrap()
}

#[tokio::test]
async fn test_token_failure_short_circuits() {
    let mut tokens = MockTokens::new();
    tokens
        .expect_access_token()
        .returning(|| Err(AuthError::NotAuthenticated));

    let mut catalog = MockCatalog::new();
    catalog.expect_list_media().never();
    catalog.expect_download_url().never();

    let repo = repository(tokens, catalog, Arc::new(ManualClock::new()));

    let err = repo.url_from_id("rain-01").await.unwrap_err();
    assert_eq!(err, AppError::Generic("Not authenticated".into()));

    let policy = CachePolicy::cache_first(Duration::from_secs(60)).unwrap();
    assert!(repo.list_media(policy).await.is_err());
}

#[tokio::test]
async fn test_list_media_caches_by_policy() {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_list_media()
        .withf(|token| token == "bearer")
        .times(2)
        .returning(|_| Ok(vec![remote("rain-01"), remote("ocean-02")]));

    let clock = Arc::new(ManualClock::new());
    let repo = repository(valid_tokens(), catalog, clock.clone());
    let policy = CachePolicy::cache_first(Duration::from_secs(60)).unwrap();

    assert_eq!(repo.list_media(policy).await.unwrap().len(), 2);
    assert_eq!(repo.list_media(policy).await.unwrap().len(), 2);

    clock.advance(Duration::from_secs(61));
    assert_eq!(repo.list_media(policy).await.unwrap()[1].id, "ocean-02");
}

#[tokio::test]
async fn test_never_policy_always_fetches() {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_list_media()
        .times(2)
        .returning(|_| Ok(vec![remote("rain-01")]));

    let repo = repository(valid_tokens(), catalog, Arc::new(ManualClock::new()));

    repo.list_media(CachePolicy::Never).await.unwrap();
    repo.list_media(CachePolicy::Never).await.unwrap();
}

#[tokio::test]
async fn test_url_from_id_resolves_and_caches() {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_list_media()
        .times(1)
        .returning(|_| Ok(vec![remote("rain-01")]));
    catalog
        .expect_download_url()
        .withf(|token, path| token == "bearer" && path == "tracks/rain-01.mp3")
        .times(1)
        .returning(|_, _| Ok("https://resource".to_string()));

    let repo = repository(valid_tokens(), catalog, Arc::new(ManualClock::new()));

    assert_eq!(repo.url_from_id("rain-01").await.unwrap(), "https://resource");
    assert_eq!(repo.url_from_id("rain-01").await.unwrap(), "https://resource");
}

#[tokio::test]
async fn test_url_from_id_takes_one_token() {
    let mut tokens = MockTokens::new();
    tokens
        .expect_access_token()
        .times(1)
        .returning(|| Ok(AccessToken::new("bearer")));

    let mut catalog = MockCatalog::new();
    catalog
        .expect_list_media()
        .withf(|token| token == "bearer")
        .times(1)
        .returning(|_| Ok(vec![remote("rain-01")]));
    catalog
        .expect_download_url()
        .times(1)
        .returning(|_, _| Ok("https://resource".to_string()));

    let repo = repository(tokens, catalog, Arc::new(ManualClock::new()));

    assert_eq!(repo.url_from_id("rain-01").await.unwrap(), "https://resource");
}

#[tokio::test]
async fn test_unknown_id_is_file_not_found() {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_list_media()
        .returning(|_| Ok(vec![remote("rain-01")]));
    catalog.expect_download_url().never();

    let repo = repository(valid_tokens(), catalog, Arc::new(ManualClock::new()));

    let err = repo.url_from_id("missing").await.unwrap_err();
    assert_eq!(err, AppError::FileNotFound("missing".into()));
}

#[tokio::test]
async fn test_download_failure_is_generic() {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_list_media()
        .returning(|_| Ok(vec![remote("rain-01")]));
    catalog
        .expect_download_url()
        .returning(|_, _| Err(BridgeError::Network("timeout".into())));

    let repo = repository(valid_tokens(), catalog, Arc::new(ManualClock::new()));

    assert!(matches!(
        repo.url_from_id("rain-01").await,
        Err(AppError::Generic(_))
    ));
}

#[tokio::test]
async fn test_clear_cache_refetches_and_publishes() {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_list_media()
        .times(2)
        .returning(|_| Ok(vec![remote("rain-01")]));

    let bus = EventBus::new(16);
    let mut events = bus.subscribe();
    let repo = RemoteMediaRepository::new(
        Arc::new(valid_tokens()),
        Arc::new(catalog),
        Arc::new(ManualClock::new()),
        CacheSettings::default(),
        bus,
    )
    .unwrap();
    let policy = CachePolicy::cache_first(Duration::from_secs(60)).unwrap();

    repo.list_media(policy).await.unwrap();
    repo.clear_cache();
    repo.list_media(policy).await.unwrap();

    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Library(LibraryEvent::CatalogLoaded { count: 1 })
    );
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Library(LibraryEvent::CacheCleared)
    );
}

#[test]
fn test_zero_ttl_settings_rejected() {
    let settings = CacheSettings {
        catalog_ttl: Duration::ZERO,
        ..CacheSettings::default()
    };

    let result = RemoteMediaRepository::new(
        Arc::new(MockTokens::new()),
        Arc::new(MockCatalog::new()),
        Arc::new(ManualClock::new()),
        settings,
        EventBus::new(4),
    );

    assert!(matches!(result, Err(AppError::InvalidArgument(_))));
}
