//! Vantage Auth Core - Identity bridge business logic
//!
//! Verifies tokens issued by the external identity provider, mints
//! internally-scoped session tokens, and provisions the backing
//! `User`/`Business` rows exactly once per logical identity.
//!
//! The pipeline, leaf-first: [`token::ParsedToken`] (compact-token codec),
//! [`jwks::KeySetCache`] (TTL-cached provider keys), [`verify`] (RS256
//! signature check), [`claims`] (expiry/issuer validation and identity
//! extraction), [`session::SessionMinter`] (HS256 session tokens), and
//! [`gate::AuthGate`] tying them together per request.

pub mod claims;
pub mod config;
pub mod error;
pub mod gate;
pub mod jwks;
pub mod provision;
pub mod session;
pub mod token;
pub mod verify;

pub use config::{AuthConfig, ConfigError};
pub use error::AuthError;
pub use gate::AuthGate;
pub use jwks::{Jwk, KeySetCache};
pub use provision::EntityProvisioner;
pub use session::{MintedSession, SessionMinter};
pub use token::ParsedToken;
