use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default HTTP listen address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default user DN template. `{username}` is replaced by the RFC 4514 escaped
/// username and `{base_dn}` by `LDAP_BASE_DN`.
pub const DEFAULT_USER_DN_TEMPLATE: &str = "uid={username},ou=users,{base_dn}";

/// Default filter selecting person entries during user sync.
pub const DEFAULT_USER_FILTER: &str = "(objectClass=inetOrgPerson)";

/// Default directory connect timeout in seconds.
pub const DEFAULT_LDAP_CONNECT_TIMEOUT_SECONDS: u64 = 5;

/// Maximum directory connect timeout in seconds.
pub const MAX_LDAP_CONNECT_TIMEOUT_SECONDS: u64 = 60;

/// Default directory operation (bind/search) timeout in seconds.
pub const DEFAULT_LDAP_OPERATION_TIMEOUT_SECONDS: u64 = 10;

/// Maximum directory operation timeout in seconds.
pub const MAX_LDAP_OPERATION_TIMEOUT_SECONDS: u64 = 120;

/// Minimum token signing secret length in bytes.
///
/// HS256 keys shorter than the 256-bit hash output weaken the MAC
/// (RFC 7518 Section 3.2).
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Minimum token lifetime (1 minute).
pub const MIN_JWT_EXPIRATION_SECONDS: i64 = 60;

/// Maximum token lifetime (24 hours). Tokens cannot be revoked, so the
/// lifetime is the only bound on a leaked token's usefulness.
pub const MAX_JWT_EXPIRATION_SECONDS: i64 = 86_400;

/// Default JWT clock skew tolerance in seconds (5 minutes).
pub const DEFAULT_JWT_CLOCK_SKEW_SECONDS: i64 = 300;

/// Maximum JWT clock skew tolerance in seconds (10 minutes).
pub const MAX_JWT_CLOCK_SKEW_SECONDS: i64 = 600;

/// How the directory connection is protected in transit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportSecurity {
    /// `ldaps://` - TLS from the first byte.
    Tls,
    /// `ldap://` upgraded with the StartTLS extended operation.
    StartTls,
    /// `ldap://` without encryption. Only allowed with `LDAP_ALLOW_INSECURE=true`.
    Plain,
}

impl TransportSecurity {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportSecurity::Tls => "tls",
            TransportSecurity::StartTls => "starttls",
            TransportSecurity::Plain => "plain",
        }
    }
}

/// Directory (LDAP) connection settings.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub url: String,
    pub base_dn: String,
    pub bind_dn: String,
    pub bind_password: SecretString,
    pub user_dn_template: String,
    pub user_filter: String,
    pub transport: TransportSecurity,
    pub tls_no_verify: bool,
    pub connect_timeout: Duration,
    pub operation_timeout: Duration,
}

/// Token signing settings.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub signing_secret: SecretString,
    pub expiration_seconds: i64,
    pub clock_skew_seconds: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub directory: DirectoryConfig,
    pub token: TokenConfig,
    pub diagnostics_enabled: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid directory URL: {0}")]
    InvalidDirectoryUrl(String),

    #[error("Insecure directory transport: {0}")]
    InsecureTransport(String),

    #[error("Invalid user DN template: {0}")]
    InvalidDnTemplate(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let directory = DirectoryConfig::from_vars(vars)?;
        let token = TokenConfig::from_vars(vars)?;
        let diagnostics_enabled = parse_bool(vars, "DIAGNOSTICS_ENABLED")?;

        Ok(Config {
            bind_address,
            directory,
            token,
            diagnostics_enabled,
        })
    }
}

impl DirectoryConfig {
    fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let url = required(vars, "LDAP_URL")?;
        let base_dn = required(vars, "LDAP_BASE_DN")?;
        let bind_dn = required(vars, "LDAP_BIND_DN")?;
        let bind_password = SecretString::from(required(vars, "LDAP_BIND_PASSWORD")?);

        let user_dn_template = vars
            .get("LDAP_USER_DN_TEMPLATE")
            .cloned()
            .unwrap_or_else(|| DEFAULT_USER_DN_TEMPLATE.to_string());

        if !user_dn_template.contains("{username}") {
            return Err(ConfigError::InvalidDnTemplate(
                "template must contain the {username} placeholder".to_string(),
            ));
        }

        let user_filter = vars
            .get("LDAP_USER_FILTER")
            .cloned()
            .unwrap_or_else(|| DEFAULT_USER_FILTER.to_string());

        let starttls = parse_bool(vars, "LDAP_STARTTLS")?;
        let allow_insecure = parse_bool(vars, "LDAP_ALLOW_INSECURE")?;
        let transport = resolve_transport(&url, starttls, allow_insecure)?;
        let tls_no_verify = parse_bool(vars, "LDAP_TLS_NO_VERIFY")?;

        let connect_timeout = parse_seconds(
            vars,
            "LDAP_CONNECT_TIMEOUT_SECONDS",
            DEFAULT_LDAP_CONNECT_TIMEOUT_SECONDS,
            MAX_LDAP_CONNECT_TIMEOUT_SECONDS,
        )?;
        let operation_timeout = parse_seconds(
            vars,
            "LDAP_OPERATION_TIMEOUT_SECONDS",
            DEFAULT_LDAP_OPERATION_TIMEOUT_SECONDS,
            MAX_LDAP_OPERATION_TIMEOUT_SECONDS,
        )?;

        Ok(DirectoryConfig {
            url,
            base_dn,
            bind_dn,
            bind_password,
            user_dn_template,
            user_filter,
            transport,
            tls_no_verify,
            connect_timeout,
            operation_timeout,
        })
    }
}

impl TokenConfig {
    fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let signing_secret = SecretString::from(required(vars, "JWT_SECRET")?);

        if signing_secret.expose_secret().len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "Expected at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                signing_secret.expose_secret().len()
            )));
        }

        let expiration_raw = required(vars, "JWT_EXPIRATION_SECONDS")?;
        let expiration_seconds: i64 =
            expiration_raw
                .parse()
                .map_err(|e| ConfigError::InvalidValue {
                    name: "JWT_EXPIRATION_SECONDS".to_string(),
                    reason: format!("not an integer: {}", e),
                })?;

        if !(MIN_JWT_EXPIRATION_SECONDS..=MAX_JWT_EXPIRATION_SECONDS).contains(&expiration_seconds)
        {
            return Err(ConfigError::InvalidValue {
                name: "JWT_EXPIRATION_SECONDS".to_string(),
                reason: format!(
                    "must be between {} and {}, got {}",
                    MIN_JWT_EXPIRATION_SECONDS, MAX_JWT_EXPIRATION_SECONDS, expiration_seconds
                ),
            });
        }

        let clock_skew_seconds = match vars.get("JWT_CLOCK_SKEW_SECONDS") {
            Some(raw) => {
                let value: i64 = raw.parse().map_err(|e| ConfigError::InvalidValue {
                    name: "JWT_CLOCK_SKEW_SECONDS".to_string(),
                    reason: format!("not an integer: {}", e),
                })?;
                if !(0..=MAX_JWT_CLOCK_SKEW_SECONDS).contains(&value) {
                    return Err(ConfigError::InvalidValue {
                        name: "JWT_CLOCK_SKEW_SECONDS".to_string(),
                        reason: format!(
                            "must be between 0 and {}, got {}",
                            MAX_JWT_CLOCK_SKEW_SECONDS, value
                        ),
                    });
                }
                value
            }
            None => DEFAULT_JWT_CLOCK_SKEW_SECONDS,
        };

        Ok(TokenConfig {
            signing_secret,
            expiration_seconds,
            clock_skew_seconds,
        })
    }
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .filter(|value| !value.trim().is_empty())
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn parse_bool(vars: &HashMap<String, String>, name: &str) -> Result<bool, ConfigError> {
    match vars.get(name).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if v.is_empty() || v == "false" || v == "0" => Ok(false),
        Some(v) if v == "true" || v == "1" => Ok(true),
        Some(v) => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("expected true or false, got '{}'", v),
        }),
    }
}

fn parse_seconds(
    vars: &HashMap<String, String>,
    name: &str,
    default: u64,
    max: u64,
) -> Result<Duration, ConfigError> {
    let seconds = match vars.get(name) {
        Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("not a positive integer: {}", e),
        })?,
        None => default,
    };

    if !(1..=max).contains(&seconds) {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("must be between 1 and {}, got {}", max, seconds),
        });
    }

    Ok(Duration::from_secs(seconds))
}

/// Decide the transport mode from the URL scheme and flags.
///
/// The port in the URL is always honored; the scheme selects TLS.
fn resolve_transport(
    url: &str,
    starttls: bool,
    allow_insecure: bool,
) -> Result<TransportSecurity, ConfigError> {
    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| ConfigError::InvalidDirectoryUrl(format!("missing scheme in '{}'", url)))?;

    let host = rest.split(['/', '?']).next().unwrap_or_default();
    if host.is_empty() || host.starts_with(':') {
        return Err(ConfigError::InvalidDirectoryUrl(format!(
            "missing host in '{}'",
            url
        )));
    }

    match scheme.to_ascii_lowercase().as_str() {
        "ldaps" => {
            if starttls {
                return Err(ConfigError::InvalidDirectoryUrl(
                    "LDAP_STARTTLS cannot be combined with an ldaps:// URL".to_string(),
                ));
            }
            Ok(TransportSecurity::Tls)
        }
        "ldap" if starttls => Ok(TransportSecurity::StartTls),
        "ldap" if allow_insecure => Ok(TransportSecurity::Plain),
        "ldap" => Err(ConfigError::InsecureTransport(
            "ldap:// without LDAP_STARTTLS sends credentials in cleartext; \
             set LDAP_STARTTLS=true, use ldaps://, or set LDAP_ALLOW_INSECURE=true"
                .to_string(),
        )),
        other => Err(ConfigError::InvalidDirectoryUrl(format!(
            "unsupported scheme '{}'",
            other
        ))),
    }
}
