//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use intake_core::validation::is_valid_email;
use intake_core::{Config, NotificationProvider};

/// Address part of `Name <addr@example.com>` or a bare address.
fn address_of(mailbox: &str) -> &str {
    match (mailbox.rfind('<'), mailbox.rfind('>')) {
        (Some(start), Some(end)) if start < end => mailbox[start + 1..end].trim(),
        _ => mailbox.trim(),
    }
}

/// Validate critical configuration values
///
/// Fails fast on settings that would make every submission fail or that are
/// unsafe in production.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production - this is a security risk. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if config.max_file_size_bytes() == 0 {
        return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB cannot be 0"));
    }

    if config.request_timeout_secs() == 0 {
        return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECS cannot be 0"));
    }

    if config.notification_timeout_secs() == 0 {
        return Err(anyhow::anyhow!("NOTIFICATION_TIMEOUT_SECS cannot be 0"));
    }

    if config.notification_timeout_secs() >= config.request_timeout_secs() {
        tracing::warn!(
            notification_timeout_secs = config.notification_timeout_secs(),
            request_timeout_secs = config.request_timeout_secs(),
            "Notification timeout is not shorter than the request timeout - slow deliveries will surface as 408"
        );
    }

    let provider = config.notification_provider();
    let notification = config.notification();

    match provider {
        NotificationProvider::Log => {
            if config.is_production() {
                tracing::warn!("Notification provider is 'log' in production - submissions will not be delivered");
            }
            return Ok(());
        }
        NotificationProvider::Resend => {
            if notification.resend_api_key.is_none() {
                return Err(anyhow::anyhow!(
                    "RESEND_API_KEY is required when NOTIFICATION_PROVIDER=resend"
                ));
            }
        }
        NotificationProvider::Smtp => {
            if notification.smtp_host.is_none() {
                return Err(anyhow::anyhow!(
                    "SMTP_HOST is required when NOTIFICATION_PROVIDER=smtp"
                ));
            }
            if notification.smtp_user.is_some() != notification.smtp_password.is_some() {
                return Err(anyhow::anyhow!(
                    "SMTP_USER and SMTP_PASSWORD must be set together"
                ));
            }
        }
    }

    if !is_valid_email(address_of(config.from_email())) {
        return Err(anyhow::anyhow!(
            "FROM_EMAIL must be a valid sender address (got '{}')",
            config.from_email()
        ));
    }

    if config.to_emails().is_empty() {
        return Err(anyhow::anyhow!(
            "TO_EMAIL must list at least one recipient for provider '{}'",
            provider.as_str()
        ));
    }

    if let Some(invalid) = config
        .to_emails()
        .iter()
        .find(|to| !is_valid_email(address_of(to)))
    {
        return Err(anyhow::anyhow!(
            "TO_EMAIL contains an invalid address: '{}'",
            invalid
        ));
    }

    Ok(())
}
