//! Handles settings for the application. Configuration is read from
//! `settings.toml` (optional) and `FUNDS__*` environment variables, e.g.
//! `FUNDS__SERVER__PORT=8080`.
//!
//! See `settings.toml` for the configuration.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level for the workspace crates (`error`..`trace`).
    pub level: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    /// Path of the SQLite file, created when missing.
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Notifier {
    /// Change signals buffered before writers start waiting.
    pub capacity: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct Engine {
    /// Upper bound for a single ledger operation; unset means no bound.
    pub deadline_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub server: Server,
    pub notifier: Notifier,
    #[serde(default)]
    pub engine: Engine,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name(path).required(false))
                .add_source(
                    Environment::with_prefix("FUNDS")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_config(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings = builder
            .set_default("app.level", "info")?
            .set_default("database.sqlite", "./funds.db")?
            .set_default("server.port", 3000)?
            .set_default("notifier.capacity", 1024)?
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        Settings::from_config(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
        .unwrap()
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.database, Database::Sqlite("./funds.db".to_string()));
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.bind, None);
        assert_eq!(settings.notifier.capacity, 1024);
        assert_eq!(settings.engine.deadline_ms, None);
    }

    #[test]
    fn file_values_override_defaults() {
        let settings = parse(
            r#"
            database = "memory"

            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 8080

            [engine]
            deadline_ms = 2500
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.database, Database::Memory);
        assert_eq!(settings.server.bind.as_deref(), Some("0.0.0.0"));
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.engine.deadline_ms, Some(2500));
    }
}
