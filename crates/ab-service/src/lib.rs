//! AuthBridge service library
//!
//! Delegated authentication against an LDAP directory, plus stateless
//! HMAC-signed identity tokens for the verified user.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Token signing and verification (HS256)
//! - `directory` - Directory connection traits, LDAP and in-memory backends
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - Bearer-token and metrics middleware
//! - `models` - Directory entries and request/response bodies
//! - `observability` - Correlation hashing and metrics
//! - `routes` - Router construction
//! - `services` - Directory authenticator and token service

pub mod config;
pub mod crypto;
pub mod directory;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
