use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub mail: MailConfig,
    #[serde(default)]
    pub booking: BookingRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MailMode {
    #[default]
    Console,
    Smtp,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    #[serde(default)]
    pub mode: MailMode,
    pub from_email: String,
    pub from_name: String,
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_username: String,
    #[serde(default)]
    pub smtp_password: String,
}

fn default_smtp_port() -> u16 { 587 }

#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    #[serde(default = "default_max_ticket_attempts")]
    pub max_ticket_attempts: u32,
    #[serde(default = "default_boarding_offset")]
    pub boarding_offset_minutes: i64,
}

fn default_max_ticket_attempts() -> u32 { busline_core::ticket::DEFAULT_MAX_ATTEMPTS }
fn default_boarding_offset() -> i64 { 30 }

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            max_ticket_attempts: default_max_ticket_attempts(),
            boarding_offset_minutes: default_boarding_offset(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `BUSLINE__SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("BUSLINE").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Parse a TOML document directly, without touching the filesystem or environment
    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [database]
            url = "postgres://localhost/busline"

            [mail]
            from_email = "tickets@example.com"
            from_name = "MyBusPortal"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.mail.mode, MailMode::Console);
        assert_eq!(config.mail.smtp_port, 587);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.booking.max_ticket_attempts, 5);
        assert_eq!(config.booking.boarding_offset_minutes, 30);
    }

    #[test]
    fn test_postgres_and_smtp() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 9000

            [database]
            url = "postgres://localhost/busline"

            [storage]
            backend = "postgres"

            [mail]
            mode = "smtp"
            from_email = "tickets@example.com"
            from_name = "MyBusPortal"
            smtp_host = "smtp.example.com"

            [booking]
            max_ticket_attempts = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.mail.mode, MailMode::Smtp);
        assert_eq!(config.booking.max_ticket_attempts, 8);
        assert_eq!(config.booking.boarding_offset_minutes, 30);
    }
}
