//! Bearer-credential authentication.
//!
//! Verification itself is delegated to an external identity provider behind
//! the [CredentialVerifier] trait; this module maps verified identities to
//! local user rows and guards the protected routes.

mod middleware;
mod verifier;

pub use middleware::{AuthState, auth_guard};
#[cfg(test)]
pub(crate) use middleware::resolve_user;
pub use verifier::{CredentialVerifier, FirebaseVerifier, Identity};
