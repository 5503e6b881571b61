//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use sentinel_api::AppState;
use sentinel_auth::{AuthGuard, AuthSessionService, ManualClock, PasswordHasher, TokenSigner};
use sentinel_cache::memory::MemoryRevocationStore;
use sentinel_core::config::{
    AppConfig, AuthConfig, DatabaseConfig, DirectoryProvider, LoggingConfig, RevocationConfig,
    ServerConfig, StoreProvider,
};
use sentinel_core::error::AppError;
use sentinel_core::result::AppResult;
use sentinel_core::traits::credential::CredentialVerifier;
use sentinel_core::traits::revocation::RevocationStore;
use sentinel_database::MemoryUserDirectory;
use sentinel_entity::user::{CreateUser, UserDirectory};

/// Revocation store that is always unreachable.
#[derive(Debug)]
pub struct UnreachableStore;

#[async_trait]
impl RevocationStore for UnreachableStore {
    async fn revoke(&self, _token: &str, _ttl: Duration) -> AppResult<()> {
        Err(AppError::service_unavailable("revocation store timed out"))
    }

    async fn revoke_once(&self, _token: &str, _ttl: Duration) -> AppResult<bool> {
        Err(AppError::service_unavailable("revocation store timed out"))
    }

    async fn is_revoked(&self, _token: &str) -> AppResult<bool> {
        Err(AppError::service_unavailable("revocation store timed out"))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Err(AppError::service_unavailable("revocation store timed out"))
    }
}

/// Configuration with in-memory backends and a fixed secret.
pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        auth: AuthConfig::with_secret("integration-test-secret"),
        revocation: RevocationConfig {
            provider: StoreProvider::Memory,
            ..RevocationConfig::default()
        },
        database: DatabaseConfig {
            provider: DirectoryProvider::Memory,
            ..DatabaseConfig::default()
        },
        logging: LoggingConfig::default(),
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Directory behind the router, for seeding and deactivating users
    pub directory: MemoryUserDirectory,
    /// Revocation store behind the router
    pub store: Arc<MemoryRevocationStore>,
    /// Clock used for every token issued and verified
    pub clock: ManualClock,
    hasher: Arc<PasswordHasher>,
}

impl TestApp {
    /// Default test application
    pub fn new() -> Self {
        Self::build(test_config(), None)
    }

    /// Test application with a custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        Self::build(config, None)
    }

    /// Test application whose guard and sessions use `store`
    pub fn with_store(config: AppConfig, store: Arc<dyn RevocationStore>) -> Self {
        Self::build(config, Some(store))
    }

    fn build(config: AppConfig, store_override: Option<Arc<dyn RevocationStore>>) -> Self {
        let clock = ManualClock::default();
        let memory_store = Arc::new(MemoryRevocationStore::new(&config.revocation.memory));
        let store: Arc<dyn RevocationStore> =
            store_override.unwrap_or_else(|| memory_store.clone() as Arc<dyn RevocationStore>);
        let directory = MemoryUserDirectory::new();
        let shared_directory: Arc<dyn UserDirectory> = Arc::new(directory.clone());
        let hasher = Arc::new(PasswordHasher::with_params(1024, 1, 1).expect("argon2 params"));

        let signer = Arc::new(TokenSigner::new(&config.auth, Arc::new(clock.clone())));
        let guard = Arc::new(AuthGuard::new(
            Arc::clone(&signer),
            Arc::clone(&store),
            Arc::clone(&shared_directory),
            config.revocation.failure_policy,
        ));
        let sessions = Arc::new(
            AuthSessionService::new(
                signer,
                Arc::clone(&store),
                Arc::clone(&shared_directory),
                hasher.clone(),
                Arc::clone(&guard),
                &config.auth,
            )
            .expect("session service"),
        );

        let state = AppState {
            config: Arc::new(config),
            sessions,
            guard,
            directory: shared_directory,
            revocation_store: store,
            db_pool: None,
        };

        Self {
            router: sentinel_api::build_router(state),
            directory,
            store: memory_store,
            clock,
            hasher,
        }
    }

    /// Create an active user directly in the directory and return their ID
    pub async fn create_test_user(&self, email: &str, password: &str) -> Uuid {
        let hash = self.hasher.hash(password).expect("Failed to hash password");
        self.directory
            .create(CreateUser::new(email, hash, None, None))
            .await
            .expect("Failed to create test user")
            .id
    }

    /// Login and return the `data` object of the token response
    pub async fn login(&self, email: &str, password: &str) -> Value {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });
        let response = self
            .request("POST", "/api/v1/auth/login", Some(body), None)
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.body["data"].clone()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

impl TestApp {
    /// POST a form-encoded body, as OAuth2 password clients do
    pub async fn post_form(&self, path: &str, form: &str) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Extract a string field from a token response
pub fn field<'a>(data: &'a Value, name: &str) -> &'a str {
    data[name]
        .as_str()
        .unwrap_or_else(|| panic!("missing {name} in {data}"))
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `message` of an error envelope
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}
