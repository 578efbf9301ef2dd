pub mod admin;
pub mod identity;

pub use identity::{IdentityClaims, IdentityError, IdentityProvider};
