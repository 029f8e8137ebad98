//! Application configuration loaded from environment variables.

use std::env;

use quill_core::domain::AccessPolicy;
use quill_infra::{DatabaseConfig, GeminiConfig, GoogleConfig, JwtConfig};

#[cfg(feature = "rate-limit")]
use quill_infra::RateLimitConfig;

use crate::telemetry::TelemetryConfig;

const DEFAULT_EMAIL_DOMAIN: &str = "clavr.me";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub access: AccessPolicy,
    /// Google Sign-In; `None` disables ID token login.
    pub google: Option<GoogleConfig>,
    /// Accept a bare email without proof of ownership. Development only.
    pub email_login: bool,
    /// `None` leaves the AI endpoint answering "not configured".
    pub ai: Option<GeminiConfig>,
    #[cfg(feature = "rate-limit")]
    pub ai_rate_limit: RateLimitConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database: DatabaseConfig::from_env(),
            jwt: JwtConfig::from_env(),
            access: Self::access_policy(),
            google: GoogleConfig::from_env(),
            email_login: env::var("AUTH_EMAIL_LOGIN")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            ai: GeminiConfig::from_env(),
            #[cfg(feature = "rate-limit")]
            ai_rate_limit: RateLimitConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
        }
    }

    /// `ALLOWED_EMAIL_DOMAIN` plus the comma-separated `ADMIN_EMAILS`.
    fn access_policy() -> AccessPolicy {
        let domain = env::var("ALLOWED_EMAIL_DOMAIN")
            .ok()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EMAIL_DOMAIN.to_string());
        let admins = env::var("ADMIN_EMAILS").unwrap_or_default();
        AccessPolicy::new(domain.trim(), parse_list(&admins))
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_list() {
        assert_eq!(
            parse_list(" Ana@clavr.me, ,bo@clavr.me "),
            vec!["ana@clavr.me".to_string(), "bo@clavr.me".to_string()]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_email_login_flag_is_opt_in() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("maybe"));
    }
}
