//! Common utilities and types shared across AuthBridge components.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JWT format utilities (size limits, clock skew, bearer parsing)
pub mod jwt;
