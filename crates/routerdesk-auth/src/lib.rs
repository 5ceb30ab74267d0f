//! Session authentication for the router console

pub mod jwt;
pub mod password;

pub use jwt::{JwtClaims, JwtError, JwtValidator, SESSION_TOKEN_TYPE};
pub use password::{hash_password, verify_password, PasswordError};

// Re-export useful types
pub use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};
