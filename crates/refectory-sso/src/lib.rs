//! Adapter for the campus single-sign-on service.
//!
//! The upstream speaks a CAS-style ticket-granting protocol: a credential
//! POST yields a granting ticket (`TGT…`), a second POST exchanges it for a
//! service ticket (`ST…`), and a validation GET returns an XML document
//! carrying the verified display name and durable external id.
//!
//! The [`IdentityProvider`] trait hides all of that from the API layer, so
//! tests can substitute a stub and login code never sees tickets or XML.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
#![allow(async_fn_in_trait)]

pub mod client;
pub mod error;
pub mod parse;

pub use client::{CasClient, CasConfig};
pub use error::{Error, Result};

use std::future::Future;

/// An identity the provider has vouched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsoIdentity {
  pub display_name: String,
  /// The durable id the provider knows the person by (e.g. a student
  /// number). Stable across logins; used as the local account key.
  pub external_id:  String,
}

/// Abstraction over the external single-sign-on service.
///
/// Implementations must fail — not hang — on upstream trouble: the HTTP
/// client behind [`CasClient`] carries a bounded timeout.
pub trait IdentityProvider: Send + Sync {
  /// Validate `username`/`password` upstream and return the identity the
  /// provider vouches for. Any failure (bad credentials, protocol-shape
  /// mismatch, transport error) is an [`Error`]; callers must not leak the
  /// distinction to end users.
  fn authenticate<'a>(
    &'a self,
    username: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<SsoIdentity>> + Send + 'a;
}
