//! Parsing and validation of contact/newsletter form payloads.
//!
//! The raw payload is deserialised into [`ContactForm`], then turned into a
//! [`NewSubmission`] by [`ContactForm::into_submission`]. Every field is
//! sanitised before validation and before storage.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::submission::{FormType, NewSubmission};

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$",
  )
  .expect("email pattern compiles")
});

// ─── Payload ─────────────────────────────────────────────────────────────────

/// The form fields as posted. Absent keys are `None`; present-but-empty keys
/// are `Some("")`, which matters for form-type inference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
  #[serde(rename = "full-name")]
  pub full_name: Option<String>,
  pub name:      Option<String>,
  pub email:     Option<String>,
  pub mobile:    Option<String>,
  pub company:   Option<String>,
  pub message:   Option<String>,
}

/// Every rule that failed, in rule order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.join("; "))]
pub struct ValidationErrors(pub Vec<String>);

impl ContactForm {
  /// The contact form posts `full-name` and `message`; the newsletter signup
  /// posts neither.
  pub fn form_type(&self) -> FormType {
    if self.full_name.is_some() || self.message.is_some() {
      FormType::ContactForm
    } else {
      FormType::Newsletter
    }
  }

  /// Sanitise and validate. No rule short-circuits another.
  pub fn into_submission(
    self,
    ip_address: Option<String>,
  ) -> Result<NewSubmission, ValidationErrors> {
    let form_type = self.form_type();

    let name = sanitize_input(self.full_name.or(self.name).as_deref().unwrap_or(""));
    let email = sanitize_input(self.email.as_deref().unwrap_or(""));
    let mobile = sanitize_optional(self.mobile);
    let company = sanitize_optional(self.company);
    let message = sanitize_optional(self.message);

    let mut errors = Vec::new();

    if name.is_empty() {
      errors.push("Name is required".to_owned());
    }

    if email.is_empty() {
      errors.push("Email is required".to_owned());
    } else if !is_valid_email(&email) {
      errors.push("Invalid email format".to_owned());
    }

    if form_type == FormType::ContactForm && message.is_none() {
      errors.push("Message is required".to_owned());
    }

    if !errors.is_empty() {
      return Err(ValidationErrors(errors));
    }

    Ok(NewSubmission {
      name,
      email,
      mobile,
      company,
      message,
      form_type,
      ip_address,
    })
  }
}

fn sanitize_optional(raw: Option<String>) -> Option<String> {
  raw
    .map(|v| sanitize_input(&v))
    .filter(|v| !v.is_empty())
}

// ─── Sanitising ──────────────────────────────────────────────────────────────

/// Trim, drop backslash escapes, then HTML-escape.
pub fn sanitize_input(raw: &str) -> String {
  escape_html(&strip_slashes(raw.trim()))
}

/// A backslash escapes the character after it; a trailing backslash is
/// dropped.
pub fn strip_slashes(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut chars = s.chars();
  while let Some(c) = chars.next() {
    if c == '\\' {
      if let Some(next) = chars.next() {
        out.push(next);
      }
    } else {
      out.push(c);
    }
  }
  out
}

pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#039;"),
      other => out.push(other),
    }
  }
  out
}

// ─── Email ───────────────────────────────────────────────────────────────────

/// RFC 5322 dot-atom address with a dotted hostname.
pub fn is_valid_email(address: &str) -> bool {
  if address.len() > MAX_EMAIL_LEN {
    return false;
  }
  match address.rsplit_once('@') {
    Some((local, _)) if local.len() <= MAX_LOCAL_PART_LEN => {
      EMAIL_RE.is_match(address)
    }
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn contact(name: &str, email: &str, message: &str) -> ContactForm {
    ContactForm {
      full_name: Some(name.into()),
      email: Some(email.into()),
      message: Some(message.into()),
      ..Default::default()
    }
  }

  #[test]
  fn valid_contact_submission() {
    let sub = contact("John Doe", "john@example.com", "Hello")
      .into_submission(Some("10.0.0.1".into()))
      .unwrap();
    assert_eq!(sub.name, "John Doe");
    assert_eq!(sub.form_type, FormType::ContactForm);
    assert_eq!(sub.message.as_deref(), Some("Hello"));
    assert_eq!(sub.ip_address.as_deref(), Some("10.0.0.1"));
    assert_eq!(sub.mobile, None);
  }

  #[test]
  fn name_key_with_message_is_a_contact_form() {
    let form = ContactForm {
      name: Some("John Doe".into()),
      email: Some("john@example.com".into()),
      message: Some("Hello".into()),
      ..Default::default()
    };
    assert_eq!(form.form_type(), FormType::ContactForm);
    assert_eq!(form.into_submission(None).unwrap().name, "John Doe");
  }

  #[test]
  fn newsletter_signup_does_not_need_a_message() {
    let form = ContactForm {
      name: Some("Jane".into()),
      email: Some("jane@example.com".into()),
      ..Default::default()
    };
    assert_eq!(form.form_type(), FormType::Newsletter);
    let sub = form.into_submission(None).unwrap();
    assert_eq!(sub.form_type, FormType::Newsletter);
    assert_eq!(sub.message, None);
  }

  #[test]
  fn missing_name_and_bad_email_are_both_reported() {
    let form = ContactForm {
      email: Some("bad".into()),
      message: Some("hi".into()),
      ..Default::default()
    };
    let errors = form.into_submission(None).unwrap_err();
    assert_eq!(
      errors.0,
      vec!["Name is required".to_owned(), "Invalid email format".to_owned()]
    );
  }

  #[test]
  fn every_missing_field_is_reported_in_order() {
    let errors = contact("  ", "", "   ").into_submission(None).unwrap_err();
    assert_eq!(
      errors.0,
      vec![
        "Name is required".to_owned(),
        "Email is required".to_owned(),
        "Message is required".to_owned(),
      ]
    );
  }

  #[test]
  fn invalid_email_fails_even_when_everything_else_is_valid() {
    let errors = contact("John", "not-an-email", "Hello")
      .into_submission(None)
      .unwrap_err();
    assert_eq!(errors.0, vec!["Invalid email format".to_owned()]);
  }

  #[test]
  fn fields_are_trimmed_unslashed_and_escaped() {
    assert_eq!(sanitize_input("  <b>Hi</b>  "), "&lt;b&gt;Hi&lt;/b&gt;");
    assert_eq!(sanitize_input(r"O\'Brien"), "O&#039;Brien");
    assert_eq!(sanitize_input(r"a\\b"), r"a\b");
    assert_eq!(sanitize_input("trailing\\"), "trailing");
    assert_eq!(sanitize_input(r#"say "x" & y"#), "say &quot;x&quot; &amp; y");
  }

  #[test]
  fn stored_fields_are_sanitised() {
    let sub = contact("<script>x</script>", "a@b.co", "1 < 2")
      .into_submission(None)
      .unwrap();
    assert_eq!(sub.name, "&lt;script&gt;x&lt;/script&gt;");
    assert_eq!(sub.message.as_deref(), Some("1 &lt; 2"));
  }

  #[test]
  fn email_syntax() {
    for ok in ["john@example.com", "first.last+tag@sub.example.co.uk", "x@a-b.io"] {
      assert!(is_valid_email(ok), "{ok} should be valid");
    }
    for bad in [
      "not-an-email",
      "bad",
      "@example.com",
      "john@",
      "john@localhost",
      "john..doe@example.com",
      ".john@example.com",
      "john@-example.com",
      "john doe@example.com",
      "john@example..com",
    ] {
      assert!(!is_valid_email(bad), "{bad} should be invalid");
    }
    let long_local = format!("{}@example.com", "a".repeat(65));
    assert!(!is_valid_email(&long_local));
  }
}
