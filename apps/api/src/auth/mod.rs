// Stub authentication: no user store, every well-formed request receives a signed token.

pub mod handlers;
pub mod token;

pub use token::TokenIssuer;
