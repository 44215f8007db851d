//! Parsing of the SSO wire responses.
//!
//! Ticket bodies are plain text with a mandatory prefix; the validation
//! response is namespaced XML read with `quick-xml`'s event API. Element
//! names are matched on their local part — upstream deployments have been
//! seen varying the namespace prefixes.

use quick_xml::{Reader, events::Event};

use crate::{Error, Result, SsoIdentity};

// ─── Tickets ─────────────────────────────────────────────────────────────────

/// A granting ticket body must start with `TGT`; anything else means the
/// credentials were rejected or the endpoint is not what we think it is.
pub fn granting_ticket(body: &str) -> Result<&str> {
  let ticket = body.trim();
  if !ticket.starts_with("TGT") {
    return Err(Error::Protocol("granting ticket missing TGT prefix".into()));
  }
  Ok(ticket)
}

/// A service ticket body must start with `ST`.
pub fn service_ticket(body: &str) -> Result<&str> {
  let ticket = body.trim();
  if !ticket.starts_with("ST") {
    return Err(Error::Protocol("service ticket missing ST prefix".into()));
  }
  Ok(ticket)
}

// ─── Validation document ─────────────────────────────────────────────────────

/// Extract the verified identity from a `serviceValidate` response.
///
/// The display name lives in a `USER_NAME` element and the external id in a
/// `user` element. An `authenticationFailure` element anywhere in the
/// document fails the parse outright.
pub fn validate_response(xml: &str) -> Result<SsoIdentity> {
  let mut reader = Reader::from_str(xml);
  reader.config_mut().trim_text(true);

  let mut current: Option<Vec<u8>> = None;
  let mut display_name: Option<String> = None;
  let mut external_id: Option<String> = None;

  loop {
    match reader.read_event() {
      Ok(Event::Start(ref e)) => {
        let name = e.name();
        let local = name.local_name();
        if local.as_ref() == b"authenticationFailure" {
          return Err(Error::Protocol("authentication failure".into()));
        }
        current = Some(local.as_ref().to_vec());
      }
      Ok(Event::Text(ref t)) => {
        let text = t
          .unescape()
          .map_err(|e| Error::Protocol(format!("bad xml text: {e}")))?;
        match current.as_deref() {
          Some(b"USER_NAME") => display_name = Some(text.into_owned()),
          Some(b"user") => external_id = Some(text.into_owned()),
          _ => {}
        }
      }
      Ok(Event::End(_)) => current = None,
      Ok(Event::Eof) => break,
      Err(e) => return Err(Error::Protocol(format!("bad xml: {e}"))),
      _ => {}
    }
  }

  Ok(SsoIdentity {
    display_name: display_name.ok_or(Error::MissingField("USER_NAME"))?,
    external_id:  external_id.ok_or(Error::MissingField("user"))?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn granting_ticket_accepts_tgt_prefix() {
    assert_eq!(granting_ticket("TGT-1-abc\n").unwrap(), "TGT-1-abc");
  }

  #[test]
  fn granting_ticket_rejects_other_bodies() {
    assert!(granting_ticket("error: bad credentials").is_err());
    assert!(granting_ticket("").is_err());
  }

  #[test]
  fn service_ticket_prefix() {
    assert_eq!(service_ticket("ST-9-xyz").unwrap(), "ST-9-xyz");
    assert!(service_ticket("TGT-1-abc").is_err());
  }

  #[test]
  fn validate_response_extracts_identity() {
    let xml = r#"<cas:serviceResponse xmlns:cas="http://www.yale.edu/tp/cas"
                                      xmlns:sso="http://example.edu/sso">
      <cas:authenticationSuccess>
        <cas:USER_NAME>Alice Liddell</cas:USER_NAME>
        <sso:user>202400001</sso:user>
      </cas:authenticationSuccess>
    </cas:serviceResponse>"#;

    let identity = validate_response(xml).unwrap();
    assert_eq!(identity.display_name, "Alice Liddell");
    assert_eq!(identity.external_id, "202400001");
  }

  #[test]
  fn validate_response_rejects_failure_document() {
    let xml = r#"<cas:serviceResponse xmlns:cas="http://www.yale.edu/tp/cas">
      <cas:authenticationFailure code="INVALID_TICKET">
        Ticket ST-1 not recognized
      </cas:authenticationFailure>
    </cas:serviceResponse>"#;

    assert!(matches!(validate_response(xml), Err(Error::Protocol(_))));
  }

  #[test]
  fn validate_response_requires_both_fields() {
    let xml = r#"<cas:serviceResponse xmlns:cas="http://www.yale.edu/tp/cas">
      <cas:authenticationSuccess>
        <cas:USER_NAME>Alice</cas:USER_NAME>
      </cas:authenticationSuccess>
    </cas:serviceResponse>"#;

    assert!(matches!(
      validate_response(xml),
      Err(Error::MissingField("user"))
    ));
  }

  #[test]
  fn validate_response_rejects_malformed_xml() {
    assert!(validate_response("<not-even-xml").is_err());
    assert!(validate_response("plain text").is_err());
  }
}
