use jsonwebtoken::Algorithm;
use serde::Deserialize;

const DEV_SECRET_KEY: &str = "dev-secret-key-do-not-use-in-production";

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub secret_key: String,
    pub algorithm: Algorithm,
    pub access_ttl_minutes: i64,
    pub reset_ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;

        let secret_key = match std::env::var("SECRET_KEY") {
            Ok(v) if !v.is_empty() => v,
            _ => {
                tracing::warn!("SECRET_KEY is not set; using the development key");
                DEV_SECRET_KEY.into()
            }
        };
        let algorithm = std::env::var("ALGORITHM")
            .unwrap_or_else(|_| "HS256".into())
            .parse::<Algorithm>()
            .map_err(|e| anyhow::anyhow!("unsupported ALGORITHM: {e}"))?;

        let auth = AuthConfig {
            secret_key,
            algorithm,
            access_ttl_minutes: std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
            reset_ttl_hours: std::env::var("RESET_TOKEN_EXPIRE_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
        };
        Ok(Self { database_url, auth })
    }
}
