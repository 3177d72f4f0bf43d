//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and overridden by `POSTAGE__*` environment
//! variables (e.g. `POSTAGE__APP__LEVEL=debug`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_SETTINGS_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("postage.db".to_string())
    }
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ledger {
    pub initial_budget: i64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            initial_budget: engine::DEFAULT_BUDGET,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub ledger: Ledger,
}

impl Settings {
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_SETTINGS_PATH)).required(false))
            .add_source(
                Environment::with_prefix("POSTAGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(raw: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_file_yields_defaults() {
        let settings = from_toml("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.database, Database::Sqlite("postage.db".to_string()));
        assert_eq!(settings.ledger.initial_budget, 10);
    }

    #[test]
    fn memory_database_and_budget_are_read() {
        let settings = from_toml(
            r#"
            database = "memory"

            [app]
            level = "debug"

            [ledger]
            initial_budget = 3
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.database, Database::Memory);
        assert_eq!(settings.ledger.initial_budget, 3);
    }

    #[test]
    fn sqlite_path_becomes_a_connection_url() {
        let settings = from_toml(
            r#"
            [database]
            sqlite = "/tmp/postage.db"
            "#,
        );
        assert_eq!(
            settings.database.url(),
            "sqlite:/tmp/postage.db?mode=rwc".to_string()
        );
        assert_eq!(Database::Memory.url(), "sqlite::memory:");
    }
}
