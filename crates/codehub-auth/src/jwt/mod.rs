//! Bearer-token validation. Tokens are issued elsewhere; this crate only
//! verifies them.

pub mod claims;
pub mod decoder;

pub use claims::Claims;
pub use decoder::JwtDecoder;
