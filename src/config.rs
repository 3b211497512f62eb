use std::env;

use anyhow::{Context, bail};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    pub concurrency_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = match lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            Some(url) => url,
            None => database_url_from_parts(&lookup)?,
        };
        let db_max_connections = parsed_or(&lookup, "DB_MAX_CONNECTIONS", 10);
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parsed_or(&lookup, "APP_PORT", 3000);
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .context("JWT_SECRET is not set")?;
        let jwt_ttl_minutes = parsed_or(&lookup, "JWT_TTL_MINUTES", 60);
        let concurrency_limit = parsed_or(&lookup, "CONCURRENCY_LIMIT", 100);

        Ok(Self {
            database_url,
            db_max_connections,
            host,
            port,
            jwt_secret,
            jwt_ttl_minutes,
            concurrency_limit,
        })
    }
}

fn parsed_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn database_url_from_parts<F>(lookup: &F) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let dialect = lookup("DB_DIALECT").unwrap_or_else(|| "postgres".to_string());
    let name = lookup("DB_NAME").context("DATABASE_URL or DB_NAME must be set")?;

    match dialect.as_str() {
        "postgres" | "postgresql" => {
            let host = lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string());
            let port = lookup("DB_PORT").unwrap_or_else(|| "5432".to_string());
            let user = lookup("DB_USER").context("DB_USER is not set")?;
            let user = urlencoding::encode(&user);
            // Credentials may contain URL delimiters such as `@`, `/` or `#`.
            let credentials = match lookup("DB_PASSWORD") {
                Some(password) => format!("{user}:{}", urlencoding::encode(&password)),
                None => user.into_owned(),
            };
            Ok(format!("postgres://{credentials}@{host}:{port}/{name}"))
        }
        "sqlite" => Ok(format!("sqlite://{name}?mode=rwc")),
        other => bail!("unsupported DB_DIALECT '{other}'"),
    }
}
