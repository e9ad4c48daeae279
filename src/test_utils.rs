#[cfg(test)]
pub mod test_utils {
    use crate::cli::commands::seed::seed_database;
    use crate::config::{build_app_state, AppConfig};
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::http::{header, HeaderName, HeaderValue};
    use axum_test::TestServer;
    use migration::{Migrator, MigratorTrait};
    use model::entities::{product, user};
    use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};
    use std::io::Write;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    pub const ADMIN_EMAIL: &str = "admin@example.com";
    pub const ADMIN_PASSWORD: &str = "admin-secret";
    pub const MEMBER_EMAIL: &str = "member@example.com";
    pub const MEMBER_PASSWORD: &str = "member-secret";

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Configuration pointing uploads at `upload_dir`
    pub fn test_config(upload_dir: &Path) -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            upload_dir: upload_dir.to_path_buf(),
            max_upload_mb: 1,
            ..AppConfig::default()
        }
    }

    /// A running test server with an administrator and a member without permissions
    pub struct TestApp {
        pub server: TestServer,
        pub state: AppState,
        pub admin: user::Model,
        pub member: user::Model,
        /// Kept alive for the duration of the test
        pub upload_dir: TempDir,
    }

    impl TestApp {
        pub fn admin_token(&self) -> String {
            self.state.jwt.issue(self.admin.id).expect("Failed to issue token")
        }

        pub fn member_token(&self) -> String {
            self.state.jwt.issue(self.member.id).expect("Failed to issue token")
        }

        /// Authorization header carrying the administrator's token
        pub fn admin_auth(&self) -> (HeaderName, HeaderValue) {
            bearer(&self.admin_token())
        }

        /// Authorization header carrying the member's token
        pub fn member_auth(&self) -> (HeaderName, HeaderValue) {
            bearer(&self.member_token())
        }

        pub fn db(&self) -> &DatabaseConnection {
            &self.state.db
        }
    }

    pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
        (
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).expect("Invalid header value"),
        )
    }

    /// Insert a user with the given status and no roles
    pub async fn create_test_user(
        db: &DatabaseConnection,
        email: &str,
        username: &str,
        password: &str,
        status: user::UserStatus,
    ) -> user::Model {
        user::ActiveModel {
            email: Set(email.to_string()),
            username: Set(Some(username.to_string())),
            password: Set(password.to_string()),
            status: Set(status),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create test user")
    }

    pub async fn create_test_product(db: &DatabaseConnection, name: &str) -> product::Model {
        product::ActiveModel {
            name: Set(name.to_string()),
            description: Set(Some(format!("{} description", name))),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create test product")
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// In-memory sink for formatted log lines
    #[derive(Clone, Default)]
    pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("Log buffer poisoned")).into_owned()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0
                .lock()
                .expect("Log buffer poisoned")
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Record every event at TRACE level, span fields included, until the guard drops
    pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    /// Create AppState for testing, seeded with the default roles and permissions
    pub async fn setup_test_app_state(upload_dir: &Path) -> (AppState, user::Model, user::Model) {
        let db = setup_test_db().await;

        let admin = seed_database(&db, ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .expect("Failed to seed database");
        let member = create_test_user(
            &db,
            MEMBER_EMAIL,
            "member",
            MEMBER_PASSWORD,
            user::UserStatus::Active,
        )
        .await;

        (build_app_state(db, test_config(upload_dir)), admin, member)
    }

    /// Create a test server over the full router
    pub async fn setup_test_app() -> TestApp {
        let _guard = init_test_tracing();

        let upload_dir = TempDir::new().expect("Failed to create upload directory");
        let (state, admin, member) = setup_test_app_state(upload_dir.path()).await;
        let server =
            TestServer::new(create_router(state.clone())).expect("Failed to create test server");

        TestApp {
            server,
            state,
            admin,
            member,
            upload_dir,
        }
    }
}
