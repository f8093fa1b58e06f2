//! Business logic layer.

pub mod directory_authenticator;
pub mod token_service;

pub use directory_authenticator::DirectoryAuthenticator;
pub use token_service::{IdentityToken, TokenService};
