//! Redacting wrappers for AuthBridge credentials.
//!
//! The directory bind password, the token signing secret and every password
//! presented at login are held as [`SecretString`]. Its `Debug` prints
//! `[REDACTED]`, so they stay out of `tracing` output and derived `Debug`
//! impls; reading the value requires an explicit [`ExposeSecret::expose_secret`]
//! at the point of use (the LDAP bind, the HMAC key).

pub use secrecy::{ExposeSecret, SecretString};
