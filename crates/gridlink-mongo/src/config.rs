use std::env;

use serde::Deserialize;

/// Connection settings for the document store.
#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_database")]
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            database: default_database(),
        }
    }
}

impl MongoConfig {
    /// Environment overrides take precedence over the built-in defaults.
    pub fn from_env() -> Self {
        Self {
            uri: env::var("GRIDLINK_MONGO_URI").unwrap_or_else(|_| default_uri()),
            database: env::var("GRIDLINK_MONGO_DATABASE").unwrap_or_else(|_| default_database()),
        }
    }
}

fn default_uri() -> String {
    "mongodb://127.0.0.1:27017".to_string()
}

fn default_database() -> String {
    "gridlink".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MongoConfig::default();
        assert_eq!(config.uri, "mongodb://127.0.0.1:27017");
        assert_eq!(config.database, "gridlink");
    }

    #[test]
    fn test_deserialize_partial() {
        let config: MongoConfig =
            serde_json::from_str(r#"{"database": "gridlink_test"}"#).unwrap();
        assert_eq!(config.database, "gridlink_test");
        assert_eq!(config.uri, "mongodb://127.0.0.1:27017");
    }
}
