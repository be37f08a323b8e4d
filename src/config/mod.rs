use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub text_to_sql_url: String,
    pub text_to_sql_max_rows: u32,
    pub frontend_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Self::from_lookup(|key| env::var(key))
    }

    /// Build the config from an arbitrary variable lookup. Only
    /// `DATABASE_URL` is required; everything else falls back to a default,
    /// including on unparseable values.
    fn from_lookup(
        var: impl Fn(&str) -> Result<String, env::VarError>,
    ) -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: var("DATABASE_URL")?,
            database_max_connections: var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            host: var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            text_to_sql_url: var("TEXT_TO_SQL_API_URL")
                .unwrap_or_else(|_| "http://localhost:6001".to_string()),
            text_to_sql_max_rows: var("TEXT_TO_SQL_MAX_ROWS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(1000),
            frontend_url: var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Result<String, env::VarError> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
                .ok_or(env::VarError::NotPresent)
        }
    }

    #[test]
    fn database_url_is_required() {
        let result = AppConfig::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(env::VarError::NotPresent)));
    }

    #[test]
    fn unset_variables_fall_back_to_defaults() {
        let config =
            AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/wh")]))
                .unwrap();

        assert_eq!(config.database_url, "postgres://localhost/wh");
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.text_to_sql_url, "http://localhost:6001");
        assert_eq!(config.text_to_sql_max_rows, 1000);
        assert_eq!(config.frontend_url, "http://localhost:3001");
    }

    #[test]
    fn explicit_variables_override_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/wh"),
            ("DATABASE_MAX_CONNECTIONS", "25"),
            ("BACKEND_HOST", "10.0.0.5"),
            ("BACKEND_PORT", "8080"),
            ("TEXT_TO_SQL_API_URL", "http://nl2sql.internal:6001"),
            ("TEXT_TO_SQL_MAX_ROWS", "500"),
        ]))
        .unwrap();

        assert_eq!(config.database_max_connections, 25);
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 8080);
        assert_eq!(config.text_to_sql_url, "http://nl2sql.internal:6001");
        assert_eq!(config.text_to_sql_max_rows, 500);
    }

    #[test]
    fn unparseable_numbers_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/wh"),
            ("DATABASE_MAX_CONNECTIONS", "lots"),
            ("BACKEND_PORT", "not-a-port"),
            ("TEXT_TO_SQL_MAX_ROWS", "-5"),
        ]))
        .unwrap();

        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.port, 3000);
        assert_eq!(config.text_to_sql_max_rows, 1000);
    }
}
