use std::env;
use std::fmt;

/// Secrets shorter than this are accepted but logged as weak.
const MIN_SECRET_LEN: usize = 32;

/// Runtime configuration, read once at startup.
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    /// Symmetric HS256 signing key shared by token issuance and verification.
    pub jwt_secret: String,
    /// Sets the `Secure` attribute on the session cookie.
    pub cookie_secure: bool,
    pub cors_allowed_origin: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has invalid value {:?}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            log::warn!(
                "JWT_SECRET is shorter than {} bytes; tokens are easier to forge",
                MIN_SECRET_LEN
            );
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_port: parsed("SERVER_PORT", 8080)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            jwt_secret,
            cookie_secure: parsed("COOKIE_SECURE", true)?,
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").ok().filter(|o| !o.is_empty()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn parsed<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}
