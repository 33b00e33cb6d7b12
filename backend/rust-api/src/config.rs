use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Where game state, content blobs and portfolio tables live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory only; everything is lost on restart.
    Memory,
    /// Redis for game state, MongoDB for content and tables.
    External,
}

impl FromStr for StorageBackend {
    type Err = config::ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "external" => Ok(StorageBackend::External),
            other => Err(config::ConfigError::Message(format!(
                "Unknown storage backend: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app_env: String,
    pub bind_addr: String,
    pub storage_backend: StorageBackend,
    pub mongo_uri: Option<String>,
    pub mongo_database: String,
    pub redis_uri: Option<String>,
    /// Expiry for persisted game states; `None` keeps them forever.
    pub game_state_ttl_seconds: Option<u64>,
    pub admin_password: String,
    /// `user:password` expected on `/metrics`.
    pub metrics_auth: String,
    pub gate_delay_ms: u64,
    /// How long an untouched player runtime stays in memory.
    pub session_idle_seconds: u64,
    /// Origin quoted in the score share text.
    pub site_origin: String,
}

const DEV_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_SESSION_IDLE_SECONDS: u64 = 1800;

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env first, then the local one
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/{env}.toml, overridden by APP__SECTION__KEY variables
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", app_env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or_else(|_| "0.0.0.0:8081".to_string());

        let storage_backend = settings
            .get_string("storage.backend")
            .or_else(|_| env::var("STORAGE_BACKEND"))
            .unwrap_or_else(|_| "memory".to_string())
            .parse::<StorageBackend>()?;

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .ok();

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "portfolio".to_string());

        let redis_uri = settings
            .get_string("redis.uri")
            .or_else(|_| env::var("REDIS_URI"))
            .ok();

        if storage_backend == StorageBackend::External && (mongo_uri.is_none() || redis_uri.is_none()) {
            return Err(config::ConfigError::Message(
                "External storage needs both MONGO_URI and REDIS_URI".to_string(),
            ));
        }

        let game_state_ttl_seconds = settings
            .get_int("redis.game_state_ttl_seconds")
            .ok()
            .or_else(|| {
                env::var("GAME_STATE_TTL_SECONDS")
                    .ok()
                    .and_then(|value| value.parse().ok())
            })
            .and_then(|ttl| u64::try_from(ttl).ok())
            .filter(|ttl| *ttl > 0);

        let admin_password = match settings
            .get_string("admin.password")
            .or_else(|_| env::var("ADMIN_PASSWORD"))
        {
            Ok(password) if !password.is_empty() => password,
            _ if app_env == "prod" => {
                return Err(config::ConfigError::Message(
                    "ADMIN_PASSWORD must be set in production".to_string(),
                ));
            }
            _ => {
                eprintln!("WARNING: Using default admin password (dev mode only!)");
                DEV_ADMIN_PASSWORD.to_string()
            }
        };

        let metrics_auth = settings
            .get_string("metrics.auth")
            .or_else(|_| env::var("METRICS_AUTH"))
            .unwrap_or_else(|_| "admin:changeme".to_string());

        let gate_delay_ms = settings
            .get_int("quiz.gate_delay_ms")
            .ok()
            .and_then(|ms| u64::try_from(ms).ok())
            .or_else(|| {
                env::var("GATE_DELAY_MS")
                    .ok()
                    .and_then(|value| value.parse().ok())
            })
            .unwrap_or(3000);

        let session_idle_seconds = settings
            .get_int("quiz.session_idle_seconds")
            .ok()
            .and_then(|secs| u64::try_from(secs).ok())
            .or_else(|| {
                env::var("SESSION_IDLE_SECONDS")
                    .ok()
                    .and_then(|value| value.parse().ok())
            })
            .unwrap_or(DEFAULT_SESSION_IDLE_SECONDS);

        let site_origin = settings
            .get_string("site.origin")
            .or_else(|_| env::var("SITE_ORIGIN"))
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        Ok(Config {
            app_env,
            bind_addr,
            storage_backend,
            mongo_uri,
            mongo_database,
            redis_uri,
            game_state_ttl_seconds,
            admin_password,
            metrics_auth,
            gate_delay_ms,
            session_idle_seconds,
            site_origin,
        })
    }

    /// Self-contained settings: memory storage and the dev credentials.
    pub fn in_memory() -> Self {
        Config {
            app_env: "test".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            storage_backend: StorageBackend::Memory,
            mongo_uri: None,
            mongo_database: "portfolio".to_string(),
            redis_uri: None,
            game_state_ttl_seconds: None,
            admin_password: DEV_ADMIN_PASSWORD.to_string(),
            metrics_auth: "admin:changeme".to_string(),
            gate_delay_ms: 3000,
            session_idle_seconds: DEFAULT_SESSION_IDLE_SECONDS,
            site_origin: "http://localhost:8080".to_string(),
        }
    }
}
