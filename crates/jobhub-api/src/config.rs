//! Server configuration.

use std::env;
use std::path::PathBuf;

use tracing::warn;

/// Fallback secret for local development only.
const DEV_JWT_SECRET: &str = "jobhub-dev-secret-change-me";

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Port the server binds on.
    pub port: u16,
    /// Allowed CORS origins; `*` allows any.
    pub cors_origins: Vec<String>,
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: String,
    /// Token lifetime in hours.
    pub token_ttl_hours: i64,
    /// Directory the document store keeps its collections in.
    pub data_dir: PathBuf,
    /// Directory uploaded resumes are written to and served from.
    pub uploads_dir: PathBuf,
}

impl ApiConfig {
    /// Load configuration from environment variables, with defaults that
    /// match local development.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set; using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        let token_ttl_hours = env::var("TOKEN_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30 * 24);

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let uploads_dir = env::var("UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));

        Self {
            port,
            cors_origins,
            jwt_secret,
            token_ttl_hours,
            data_dir,
            uploads_dir,
        }
    }
}
