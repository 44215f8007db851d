//! User and admin accounts.
//!
//! A [`User`] is created on first federated login with the identity the
//! single-sign-on service vouched for, or implicitly when an admin registers.
//! An [`Admin`] is a locally-credentialled overlay: one-to-one with a user
//! flagged `is_admin`, holding its own access name, password hash and
//! privilege set.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── User ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:           i64,
  pub display_name: String,
  /// Durable link to the identity provider; `None` for admin-only accounts.
  pub external_id:  Option<String>,
  pub is_admin:     bool,
  /// Opaque reference to an avatar image (object key or URL).
  pub avatar:       Option<String>,
}

/// Fields a user (or an admin on their behalf) may change after creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
  pub display_name: Option<String>,
  pub avatar:       Option<String>,
}

// ─── Admin ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Admin {
  pub id:          i64,
  pub user_id:     i64,
  pub access_name: String,
  /// Argon2 PHC string. Never serialised into API responses.
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub privileges:  PrivilegeSet,
}

// ─── Privileges ───────────────────────────────────────────────────────────────

/// A single administrative capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
  Canteens,
  Dishes,
  Carousels,
  Feedback,
  Users,
}

impl Privilege {
  pub const ALL: [Privilege; 5] = [
    Privilege::Canteens,
    Privilege::Dishes,
    Privilege::Carousels,
    Privilege::Feedback,
    Privilege::Users,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Privilege::Canteens => "canteens",
      Privilege::Dishes => "dishes",
      Privilege::Carousels => "carousels",
      Privilege::Feedback => "feedback",
      Privilege::Users => "users",
    }
  }

  pub fn parse(s: &str) -> Result<Privilege> {
    match s {
      "canteens" => Ok(Privilege::Canteens),
      "dishes" => Ok(Privilege::Dishes),
      "carousels" => Ok(Privilege::Carousels),
      "feedback" => Ok(Privilege::Feedback),
      "users" => Ok(Privilege::Users),
      other => Err(Error::UnknownPrivilege(other.to_string())),
    }
  }
}

/// The set of capabilities granted to an admin.
///
/// Persisted as comma-delimited tokens; the token `all` grants every
/// capability. Parsed once at load, never re-scanned per check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivilegeSet(Vec<Privilege>);

impl PrivilegeSet {
  /// Every capability — the default for newly registered admins.
  pub fn all() -> Self { Self(Privilege::ALL.to_vec()) }

  pub fn new(privileges: Vec<Privilege>) -> Self {
    let mut set = Self(Vec::new());
    for p in privileges {
      set.insert(p);
    }
    set
  }

  pub fn insert(&mut self, p: Privilege) {
    if !self.0.contains(&p) {
      self.0.push(p);
    }
  }

  pub fn contains(&self, p: Privilege) -> bool { self.0.contains(&p) }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Parse the stored comma-delimited form. Empty text is an empty set.
  pub fn parse(text: &str) -> Result<Self> {
    let mut set = Self(Vec::new());
    for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
      if token == "all" {
        return Ok(Self::all());
      }
      set.insert(Privilege::parse(token)?);
    }
    Ok(set)
  }

  /// Comma-delimited storage form. The full set collapses to `all`.
  pub fn encode(&self) -> String {
    if Privilege::ALL.iter().all(|p| self.contains(*p)) {
      return "all".to_string();
    }
    self
      .0
      .iter()
      .map(|p| p.as_str())
      .collect::<Vec<_>>()
      .join(",")
  }
}
