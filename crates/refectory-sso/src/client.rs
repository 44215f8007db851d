//! Async HTTP client speaking the ticket-granting SSO protocol.

use std::time::Duration;

use reqwest::Client;

use crate::{Error, IdentityProvider, Result, SsoIdentity, parse};

/// Connection settings for the SSO upstream.
#[derive(Debug, Clone)]
pub struct CasConfig {
  /// Base URL of the SSO deployment, with trailing slash.
  pub base_url:    String,
  /// Service URL registered with the SSO; echoed in ticket exchange and
  /// validation.
  pub service_url: String,
  /// Hard deadline for each upstream call. A hung SSO must not hang login.
  pub timeout:     Duration,
}

/// Client for the two-call ticket-granting flow.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct CasClient {
  http:   Client,
  config: CasConfig,
}

impl CasClient {
  pub fn new(config: CasConfig) -> Result<Self> {
    let http = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { http, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Send a request, retrying once on transport-level failure (timeout,
  /// connect). Protocol-level failures are never retried.
  async fn send_with_retry(
    &self,
    build: impl Fn() -> reqwest::RequestBuilder,
  ) -> Result<reqwest::Response> {
    match build().send().await {
      Ok(resp) => Ok(resp),
      Err(e) if e.is_timeout() || e.is_connect() => {
        tracing::debug!(error = %e, "sso transport error, retrying once");
        Ok(build().send().await?)
      }
      Err(e) => Err(Error::Upstream(e)),
    }
  }

  /// Step 1: exchange credentials for a granting ticket.
  async fn granting_ticket(&self, username: &str, password: &str) -> Result<String> {
    let url = self.url("/cas/restlet/tickets");
    let resp = self
      .send_with_retry(|| {
        self.http.post(&url).form(&[
          ("username", username),
          ("password", password),
          ("lt", "LT-1-1-1"),
        ])
      })
      .await?;
    let body = resp.text().await?;
    Ok(parse::granting_ticket(&body)?.to_string())
  }

  /// Step 2: exchange the granting ticket for a service ticket.
  async fn service_ticket(&self, tgt: &str) -> Result<String> {
    let url = self.url(&format!("/cas/restlet/tickets/{tgt}"));
    let body_payload = format!("service={}", self.config.service_url);
    let resp = self
      .send_with_retry(|| {
        self
          .http
          .post(&url)
          .header(reqwest::header::CONTENT_TYPE, "text/plain")
          .body(body_payload.clone())
      })
      .await?;
    let body = resp.text().await?;
    Ok(parse::service_ticket(&body)?.to_string())
  }

  /// Step 3: validate the service ticket and read back the identity.
  async fn validate(&self, st: &str) -> Result<SsoIdentity> {
    let url = self.url("/cas/serviceValidate");
    let resp = self
      .send_with_retry(|| {
        self
          .http
          .get(&url)
          .query(&[("ticket", st), ("service", self.config.service_url.as_str())])
      })
      .await?;
    let body = resp.text().await?;
    parse::validate_response(&body)
  }
}

impl IdentityProvider for CasClient {
  async fn authenticate(&self, username: &str, password: &str) -> Result<SsoIdentity> {
    let tgt = self.granting_ticket(username, password).await?;
    let st = self.service_ticket(&tgt).await?;
    self.validate(&st).await
  }
}
