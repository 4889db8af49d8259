use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::warn;

/// Placeholder secret used when `CHIRP_JWT_SECRET` is unset. Fine for local
/// development only; tokens signed with it are trivially forgeable.
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = std::env::var("CHIRP_JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.into());
        if jwt_secret == DEV_JWT_SECRET {
            warn!("CHIRP_JWT_SECRET is unset; using the development placeholder");
        }

        Ok(Self {
            host: std::env::var("CHIRP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("CHIRP_PORT")
                .unwrap_or_else(|_| "3000".into())
                .parse()?,
            db_path: std::env::var("CHIRP_DB_PATH")
                .unwrap_or_else(|_| "chirp.db".into())
                .into(),
            jwt_secret,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}
