//! Stateless bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the user id, the admin flag and a
//! `use` discriminator separating short-lived access tokens from long-lived
//! refresh tokens. There is no revocation list: expiry is the only
//! invalidation mechanism.

use chrono::{Duration, Utc};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Signing key used when no secret is configured. Fine for local
/// development, useless in production — startup warns loudly.
const DEV_SECRET: &str = "refectory-development-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
  #[error("token expired")]
  Expired,
  /// Any structural or signature failure, including a refresh token offered
  /// where an access token is required.
  #[error("invalid token")]
  Invalid,
}

// ─── Claims ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TokenUse {
  Access,
  Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  /// User id, stringified per JWT convention.
  sub:   String,
  admin: bool,
  #[serde(rename = "use")]
  token_use: TokenUse,
  iat: i64,
  exp: i64,
}

/// The verified identity an access token proves.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
  pub user_id:  i64,
  pub is_admin: bool,
}

/// What a successful login or refresh hands back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
  pub access_token:  String,
  pub token_type:    String,
  pub refresh_token: String,
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Issues and verifies the API's bearer tokens.
///
/// Holds the process-wide signing secret, injected once at construction.
pub struct TokenService {
  encoding:    EncodingKey,
  decoding:    DecodingKey,
  access_ttl:  Duration,
  refresh_ttl: Duration,
}

impl TokenService {
  /// `secret = None` falls back to the built-in development key and warns.
  pub fn new(
    secret: Option<&str>,
    access_ttl: Duration,
    refresh_ttl: Duration,
  ) -> Self {
    let secret = match secret {
      Some(s) => s.to_owned(),
      None => {
        tracing::warn!(
          "no signing secret configured; using the built-in development key"
        );
        DEV_SECRET.to_owned()
      }
    };

    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      access_ttl,
      refresh_ttl,
    }
  }

  fn issue(
    &self,
    user_id: i64,
    is_admin: bool,
    token_use: TokenUse,
    ttl: Duration,
  ) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = Claims {
      sub:   user_id.to_string(),
      admin: is_admin,
      token_use,
      iat: now.timestamp(),
      exp: (now + ttl).timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|_| TokenError::Invalid)
  }

  /// Mint a fresh access/refresh pair for a user.
  pub fn issue_pair(
    &self,
    user_id: i64,
    is_admin: bool,
  ) -> Result<TokenPair, TokenError> {
    Ok(TokenPair {
      access_token: self.issue(user_id, is_admin, TokenUse::Access, self.access_ttl)?,
      token_type:   "bearer".to_string(),
      refresh_token: self.issue(
        user_id,
        is_admin,
        TokenUse::Refresh,
        self.refresh_ttl,
      )?,
    })
  }

  fn decode_claims(
    &self,
    token: &str,
    check_expiry: bool,
  ) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = check_expiry;

    decode::<Claims>(token, &self.decoding, &validation)
      .map(|data| data.claims)
      .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
      })
  }

  /// Verify an access token. Refresh tokens are rejected here — a
  /// long-lived credential must never double as an API pass.
  pub fn verify(&self, token: &str) -> Result<AuthContext, TokenError> {
    let claims = self.decode_claims(token, true)?;
    if claims.token_use != TokenUse::Access {
      return Err(TokenError::Invalid);
    }
    let user_id = claims.sub.parse().map_err(|_| TokenError::Invalid)?;
    Ok(AuthContext { user_id, is_admin: claims.admin })
  }

  /// Exchange a (possibly expired) access token plus a live refresh token
  /// for a fresh pair. The two subjects must match exactly.
  pub fn refresh(
    &self,
    access_token: &str,
    refresh_token: &str,
  ) -> Result<TokenPair, TokenError> {
    let refresh = self.decode_claims(refresh_token, true)?;
    if refresh.token_use != TokenUse::Refresh {
      return Err(TokenError::Invalid);
    }

    // The access token may be past expiry — that is what refresh is for —
    // but its signature and shape must still hold.
    let access = self.decode_claims(access_token, false)?;
    if access.token_use != TokenUse::Access || access.sub != refresh.sub {
      return Err(TokenError::Invalid);
    }

    let user_id = refresh.sub.parse().map_err(|_| TokenError::Invalid)?;
    self.issue_pair(user_id, refresh.admin)
  }

  /// Issue an already-expired access token. Test-only.
  #[cfg(test)]
  pub(crate) fn issue_expired_access(&self, user_id: i64, is_admin: bool) -> String {
    self
      .issue(user_id, is_admin, TokenUse::Access, Duration::hours(-2))
      .expect("issue expired token")
  }
}
