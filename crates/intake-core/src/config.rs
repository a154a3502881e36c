//! Configuration module
//!
//! Configuration is read once at startup and passed explicitly into the
//! services that need it. [`IntakeConfig::from_source`] takes a lookup function
//! so tests can build a configuration without touching the process environment.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::constants::{DEFAULT_MAX_FILE_SIZE_MB, FORM_FIELDS_BODY_ALLOWANCE, MAX_FILE_SLOTS};

// Common constants
const SERVER_PORT: u16 = 3000;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const HTTP_CONCURRENCY_LIMIT: usize = 1_000;
const NOTIFICATION_TIMEOUT_SECS: u64 = 30;
const SMTP_PORT: u16 = 587;
const RESEND_API_URL: &str = "https://api.resend.com";

/// Which outbound channel receives validated submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationProvider {
    /// Resend HTTP email API
    Resend,
    /// Plain SMTP relay
    Smtp,
    /// Log the message instead of sending it (development only)
    Log,
}

impl NotificationProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationProvider::Resend => "resend",
            NotificationProvider::Smtp => "smtp",
            NotificationProvider::Log => "log",
        }
    }
}

impl FromStr for NotificationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "resend" => Ok(NotificationProvider::Resend),
            "smtp" => Ok(NotificationProvider::Smtp),
            "log" => Ok(NotificationProvider::Log),
            other => Err(anyhow::anyhow!(
                "NOTIFICATION_PROVIDER must be 'resend', 'smtp' or 'log' (got '{}')",
                other
            )),
        }
    }
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub request_timeout_secs: u64,
    pub http_concurrency_limit: usize,
    pub log_format: String,
}

/// Outbound notification settings
#[derive(Clone)]
pub struct NotificationConfig {
    pub provider: NotificationProvider,
    pub from_email: String,
    pub to_emails: Vec<String>,
    pub resend_api_key: Option<String>,
    pub resend_api_url: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_tls: bool,
    pub timeout_secs: u64,
}

impl fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("provider", &self.provider)
            .field("from_email", &self.from_email)
            .field("to_emails", &self.to_emails)
            .field("resend_api_key", &self.resend_api_key.as_ref().map(|_| "***"))
            .field("resend_api_url", &self.resend_api_url)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "***"))
            .field("smtp_tls", &self.smtp_tls)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Intake service configuration
#[derive(Clone, Debug)]
pub struct IntakeConfig {
    pub base: BaseConfig,
    pub max_file_size_bytes: usize,
    pub notification: NotificationConfig,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<IntakeConfig>);

impl Config {
    fn as_intake(&self) -> &IntakeConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = IntakeConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_intake().base.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.as_intake().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_intake().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_intake().base.environment
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.as_intake().base.request_timeout_secs
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_intake().base.http_concurrency_limit
    }

    pub fn log_format(&self) -> &str {
        &self.as_intake().base.log_format
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_intake().max_file_size_bytes
    }

    /// Body limit for one submission: every file slot at its cap plus the text fields.
    pub fn max_request_body_bytes(&self) -> usize {
        self.max_file_size_bytes()
            .saturating_mul(MAX_FILE_SLOTS)
            .saturating_add(FORM_FIELDS_BODY_ALLOWANCE)
    }

    pub fn notification(&self) -> &NotificationConfig {
        &self.as_intake().notification
    }

    pub fn notification_provider(&self) -> NotificationProvider {
        self.as_intake().notification.provider
    }

    pub fn from_email(&self) -> &str {
        &self.as_intake().notification.from_email
    }

    pub fn to_emails(&self) -> &[String] {
        &self.as_intake().notification.to_emails
    }

    pub fn notification_timeout_secs(&self) -> u64 {
        self.as_intake().notification.timeout_secs
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl IntakeConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup (environment, map, ...).
    pub fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let server_port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let base = BaseConfig {
            server_port,
            cors_origins: split_list(&cors_origins_str),
            environment,
            request_timeout_secs: parse_or(lookup("REQUEST_TIMEOUT_SECS"), REQUEST_TIMEOUT_SECS),
            http_concurrency_limit: parse_or(
                lookup("HTTP_CONCURRENCY_LIMIT"),
                HTTP_CONCURRENCY_LIMIT,
            )
            .max(1),
            log_format: lookup("LOG_FORMAT")
                .unwrap_or_else(|| "pretty".to_string())
                .to_lowercase(),
        };

        let resend_api_key = non_empty(lookup("RESEND_API_KEY"));
        let smtp_host = non_empty(lookup("SMTP_HOST"));

        // Explicit provider wins; otherwise pick whichever provider has credentials.
        let provider = match lookup("NOTIFICATION_PROVIDER") {
            Some(p) => p.parse()?,
            None if resend_api_key.is_some() => NotificationProvider::Resend,
            None if smtp_host.is_some() => NotificationProvider::Smtp,
            None => NotificationProvider::Log,
        };

        let notification = NotificationConfig {
            provider,
            from_email: lookup("FROM_EMAIL").unwrap_or_default().trim().to_string(),
            to_emails: split_list(&lookup("TO_EMAIL").unwrap_or_default()),
            resend_api_key,
            resend_api_url: lookup("RESEND_API_URL")
                .unwrap_or_else(|| RESEND_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            smtp_host,
            smtp_port: parse_or(lookup("SMTP_PORT"), SMTP_PORT),
            smtp_user: non_empty(lookup("SMTP_USER")),
            smtp_password: non_empty(lookup("SMTP_PASSWORD")),
            smtp_tls: parse_or(lookup("SMTP_TLS").map(|v| v.to_lowercase()), true),
            timeout_secs: parse_or(
                lookup("NOTIFICATION_TIMEOUT_SECS"),
                NOTIFICATION_TIMEOUT_SECS,
            ),
        };

        let max_file_size_mb: usize =
            parse_or(lookup("MAX_FILE_SIZE_MB"), DEFAULT_MAX_FILE_SIZE_MB);

        Ok(IntakeConfig {
            base,
            max_file_size_bytes: max_file_size_mb.saturating_mul(1024 * 1024),
            notification,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<IntakeConfig, anyhow::Error> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        IntakeConfig::from_source(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_without_any_variables() {
        let config = config_from(&[]).expect("config");
        assert_eq!(config.base.server_port, 3000);
        assert_eq!(config.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.notification.provider, NotificationProvider::Log);
        assert_eq!(config.base.cors_origins, vec!["*".to_string()]);
        assert!(config.notification.to_emails.is_empty());
    }

    #[test]
    fn recipients_are_split_and_trimmed() {
        let config = config_from(&[("TO_EMAIL", " a@example.com, b@example.com ,")]).expect("config");
        assert_eq!(
            config.notification.to_emails,
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );
    }

    #[test]
    fn provider_inferred_from_credentials() {
        let resend = config_from(&[("RESEND_API_KEY", "re_123")]).expect("config");
        assert_eq!(resend.notification.provider, NotificationProvider::Resend);

        let smtp = config_from(&[("SMTP_HOST", "mail.example.com")]).expect("config");
        assert_eq!(smtp.notification.provider, NotificationProvider::Smtp);
        assert_eq!(smtp.notification.smtp_port, 587);
        assert!(smtp.notification.smtp_tls);
    }

    #[test]
    fn explicit_provider_must_be_known() {
        assert!(config_from(&[("NOTIFICATION_PROVIDER", "carrier-pigeon")]).is_err());
        let config = config_from(&[("NOTIFICATION_PROVIDER", "LOG"), ("RESEND_API_KEY", "re_1")])
            .expect("config");
        assert_eq!(config.notification.provider, NotificationProvider::Log);
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        assert!(config_from(&[("ENVIRONMENT", "production")]).is_err());
        let config = config_from(&[
            ("ENVIRONMENT", "production"),
            ("CORS_ORIGINS", "https://example.com"),
        ])
        .expect("config");
        assert!(Config(Box::new(config)).is_production());
    }

    #[test]
    fn invalid_port_is_an_error() {
        assert!(config_from(&[("PORT", "http")]).is_err());
    }

    #[test]
    fn request_body_limit_covers_both_files() {
        let config = Config(Box::new(config_from(&[("MAX_FILE_SIZE_MB", "1")]).expect("config")));
        assert_eq!(
            config.max_request_body_bytes(),
            2 * 1024 * 1024 + FORM_FIELDS_BODY_ALLOWANCE
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = config_from(&[
            ("RESEND_API_KEY", "re_secret_value"),
            ("SMTP_PASSWORD", "hunter2"),
        ])
        .expect("config");
        let rendered = format!("{:?}", config.notification);
        assert!(!rendered.contains("re_secret_value"));
        assert!(!rendered.contains("hunter2"));
    }
}
