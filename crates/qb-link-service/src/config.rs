//! Service configuration.

use serde::Deserialize;
use std::path::Path;

/// Default OAuth `state` parameter sent with the authorization request.
pub const DEFAULT_OAUTH_STATE: &str = "intuit-test";

/// Redirect URI registered for local development.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/callback";

/// Default QuickBooks API minor version.
pub const DEFAULT_MINOR_VERSION: u32 = 65;

/// Intuit authorization endpoint.
const INTUIT_AUTHORIZE_URL: &str = "https://appcenter.intuit.com/connect/oauth2";

/// Intuit token endpoint.
const INTUIT_TOKEN_URL: &str = "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer";

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: `0.0.0.0:$PORT`, `PORT` defaults to 3000).
    pub listen_addr: String,

    /// Path to the `RocksDB` data directory, used when no database host is set.
    pub data_dir: String,

    /// PostgreSQL connection settings (optional).
    pub database: Option<DatabaseConfig>,

    /// QuickBooks Online and Intuit OAuth settings.
    pub quickbooks: QuickBooksConfig,

    /// Days between an invoice's transaction date and its default due date.
    pub invoice_due_days: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// PostgreSQL connection settings.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Database user.
    pub user: String,
    /// Database password.
    pub password: String,
    /// Host, optionally with `:port`.
    pub host: String,
    /// Database name.
    pub name: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("name", &self.name)
            .finish()
    }
}

impl DatabaseConfig {
    /// Connection options for `sqlx`.
    #[must_use]
    pub fn connect_options(&self) -> sqlx::postgres::PgConnectOptions {
        let options = sqlx::postgres::PgConnectOptions::new()
            .username(&self.user)
            .password(&self.password)
            .database(&self.name);

        match self.host.rsplit_once(':') {
            Some((host, port)) => match port.parse::<u16>() {
                Ok(port) => options.host(host).port(port),
                Err(_) => options.host(&self.host),
            },
            None => options.host(&self.host),
        }
    }
}

/// QuickBooks deployment the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Sandbox companies.
    Sandbox,
    /// Live companies.
    Production,
}

impl Environment {
    /// Base URL of the accounting API for this environment.
    #[must_use]
    pub const fn api_base_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://sandbox-quickbooks.api.intuit.com",
            Self::Production => "https://quickbooks.api.intuit.com",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(format!("unknown QuickBooks environment: {other}")),
        }
    }
}

/// QuickBooks Online and Intuit OAuth settings.
#[derive(Clone)]
pub struct QuickBooksConfig {
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Redirect URI registered with Intuit (points at `/callback`).
    pub redirect_uri: String,
    /// Company (realm) the integration works against. Falls back to the
    /// `realmId` returned on the OAuth callback when unset.
    pub realm_id: Option<String>,
    /// Sandbox or production.
    pub environment: Environment,
    /// Authorization endpoint.
    pub authorize_url: String,
    /// Token endpoint.
    pub token_url: String,
    /// Accounting API base URL.
    pub api_base_url: String,
    /// API minor version sent with every request.
    pub minor_version: u32,
    /// Fixed OAuth `state` value.
    pub oauth_state: String,
}

impl std::fmt::Debug for QuickBooksConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuickBooksConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("realm_id", &self.realm_id)
            .field("environment", &self.environment)
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .field("minor_version", &self.minor_version)
            .finish_non_exhaustive()
    }
}

impl QuickBooksConfig {
    /// Settings for the given environment with Intuit's public endpoints.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            realm_id: None,
            environment,
            authorize_url: INTUIT_AUTHORIZE_URL.into(),
            token_url: INTUIT_TOKEN_URL.into(),
            api_base_url: environment.api_base_url().into(),
            minor_version: DEFAULT_MINOR_VERSION,
            oauth_state: DEFAULT_OAUTH_STATE.into(),
        }
    }

    /// Settings from loaded secrets, defaulting the redirect URI.
    fn from_secrets(secrets: QuickBooksSecrets, environment: Environment) -> Self {
        let mut config = Self::new(
            secrets.client_id,
            secrets.client_secret,
            secrets
                .redirect_uri
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.into()),
            environment,
        );
        config.realm_id = secrets.realm_id;
        config
    }

    /// Load QuickBooks settings from the secrets file or environment.
    #[must_use]
    pub fn from_env() -> Self {
        let secrets = load_quickbooks_secrets();

        let environment = std::env::var("QUICKBOOKS_ENVIRONMENT")
            .ok()
            .and_then(|s| match s.parse() {
                Ok(env) => Some(env),
                Err(e) => {
                    tracing::warn!(error = %e, "Falling back to sandbox environment");
                    None
                }
            })
            .unwrap_or(Environment::Sandbox);

        if secrets.client_id.is_empty() || secrets.client_secret.is_empty() {
            tracing::warn!("QuickBooks client credentials not configured - authorization will fail");
        }

        let mut config = Self::from_secrets(secrets, environment);

        if let Ok(url) = std::env::var("QUICKBOOKS_AUTHORIZE_URL") {
            config.authorize_url = url;
        }
        if let Ok(url) = std::env::var("QUICKBOOKS_TOKEN_URL") {
            config.token_url = url;
        }
        if let Ok(url) = std::env::var("QUICKBOOKS_API_URL") {
            config.api_base_url = url;
        }
        if let Some(version) = std::env::var("QUICKBOOKS_MINOR_VERSION")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.minor_version = version;
        }
        if let Ok(state) = std::env::var("QUICKBOOKS_OAUTH_STATE") {
            config.oauth_state = state;
        }

        config
    }
}

/// QuickBooks secrets file structure.
#[derive(Debug, Default, Deserialize)]
struct QuickBooksSecrets {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    redirect_uri: Option<String>,
    #[serde(default)]
    realm_id: Option<String>,
}

impl QuickBooksSecrets {
    /// Fill a missing or blank redirect URI and realm from `var`.
    fn with_fallback(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());

        self.redirect_uri =
            non_empty(self.redirect_uri).or_else(|| non_empty(var("QUICKBOOKS_REDIRECT_URI")));
        self.realm_id = non_empty(self.realm_id).or_else(|| non_empty(var("QUICKBOOKS_REALM_ID")));
        self
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let listen_addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| {
            let port = std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(3000);
            format!("0.0.0.0:{port}")
        });

        Self {
            listen_addr,
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/qb-link".into()),
            database: load_database_config(),
            quickbooks: QuickBooksConfig::from_env(),
            invoice_due_days: std::env::var("INVOICE_DUE_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64 * 1024), // 64KB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

/// Load PostgreSQL settings; absent unless `DB_HOST` is set.
fn load_database_config() -> Option<DatabaseConfig> {
    let host = std::env::var("DB_HOST").ok().filter(|h| !h.is_empty())?;

    Some(DatabaseConfig {
        user: std::env::var("DB_USER").unwrap_or_default(),
        password: std::env::var("DB_PASSWORD").unwrap_or_default(),
        host,
        name: std::env::var("DB_NAME").unwrap_or_else(|_| "qb_link".into()),
    })
}

/// Load QuickBooks secrets from file or environment.
///
/// Settings the file leaves out are read from the environment.
fn load_quickbooks_secrets() -> QuickBooksSecrets {
    let env = |name: &str| std::env::var(name).ok();

    let secret_paths = [
        ".secrets/quickbooks.json",
        "crates/qb-link-service/.secrets/quickbooks.json",
        "../.secrets/quickbooks.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<QuickBooksSecrets>(path) {
            tracing::info!(path = %path, "Loaded QuickBooks secrets from file");
            return secrets.with_fallback(env);
        }
    }

    // Fall back to environment variables
    tracing::debug!("QuickBooks secrets file not found, using environment variables");
    QuickBooksSecrets {
        client_id: std::env::var("QUICKBOOKS_CLIENT_ID").unwrap_or_default(),
        client_secret: std::env::var("QUICKBOOKS_CLIENT_SECRET").unwrap_or_default(),
        ..QuickBooksSecrets::default()
    }
    .with_fallback(env)
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".into(),
            data_dir: "/data/qb-link".into(),
            database: None,
            quickbooks: QuickBooksConfig::new("", "", DEFAULT_REDIRECT_URI, Environment::Sandbox),
            invoice_due_days: 30,
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
