//! Common test utilities for E2E tests

use chrono::Utc;
use huddleup::data::{EntityId, User};
use huddleup::{AppState, auth, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            database: config::DatabaseConfig { path: db_path },
            limits: config::LimitsConfig {
                comment_max_chars: 2000,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = huddleup::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Seed a user into the identity directory
    pub async fn create_user(&self, username: &str) -> User {
        let user = User {
            id: EntityId::new().0,
            username: username.to_string(),
            display_name: Some(format!("{} Fan", username)),
            created_at: Utc::now(),
        };
        self.state.db.upsert_user(&user).await.unwrap();
        user
    }

    /// Issue an access token for a user
    pub async fn create_token(&self, user: &User) -> String {
        let token = auth::generate_access_token();
        self.state
            .db
            .insert_auth_token(&user.id, &token)
            .await
            .unwrap();
        token
    }
}
