//! Admin console pages.

use chrono::Local;
use valance_core::submission::{
  Submission, SubmissionStats, SubmissionStatus, truncate_for_list,
};

use crate::{error::Error, html::HtmlWriter};

const TITLE: &str = "Valance Tek - Admin Panel";
const DATE_FORMAT: &str = "%b %d, %Y %H:%M";
const COLUMNS: [&str; 8] =
  ["ID", "Name", "Email", "Company", "Message", "Status", "Date", "Actions"];

/// Everything the dashboard shows.
pub struct Dashboard {
  pub stats:       SubmissionStats,
  pub submissions: Vec<Submission>,
}

pub fn login_page() -> Result<String, Error> {
  let mut html = page_start()?;
  html
    .open("div", &[("class", "login-form")])?
    .element("h2", &[], "Admin Login")?
    .open("form", &[("method", "post")])?
    .void("input", &[
      ("type", "password"),
      ("name", "password"),
      ("placeholder", "Enter admin password"),
      ("required", "required"),
    ])?
    .element("button", &[("type", "submit")], "Login")?
    .close("form")?
    .close("div")?;
  page_end(html)
}

pub fn dashboard_page(view: &Dashboard) -> Result<String, Error> {
  let mut html = page_start()?;

  html
    .open("div", &[("class", "header")])?
    .element("h1", &[], TITLE)?
    .element("p", &[], "Manage contact form submissions")?
    .element("a", &[("href", "?logout=1"), ("class", "btn btn-danger logout-btn")], "Logout")?
    .close("div")?;

  html.open("div", &[("class", "stats")])?;
  stat_card(&mut html, view.stats.total, "Total Submissions")?;
  stat_card(&mut html, view.stats.new, "New Messages")?;
  stat_card(&mut html, view.stats.today, "Today's Submissions")?;
  html.close("div")?;

  html
    .open("div", &[("class", "table-container")])?
    .open("table", &[])?
    .open("thead", &[])?
    .open("tr", &[])?;
  for column in COLUMNS {
    html.element("th", &[], column)?;
  }
  html.close("tr")?.close("thead")?.open("tbody", &[])?;

  if view.submissions.is_empty() {
    html
      .open("tr", &[])?
      .element("td", &[("colspan", "8"), ("class", "empty")], "No submissions yet")?
      .close("tr")?;
  }
  for submission in &view.submissions {
    submission_row(&mut html, submission)?;
  }

  html.close("tbody")?.close("table")?.close("div")?;
  page_end(html)
}

fn submission_row(html: &mut HtmlWriter, sub: &Submission) -> Result<(), Error> {
  let id = sub.id.to_string();
  let mailto = format!("mailto:{}", sub.email);
  let company = sub.company.as_deref().filter(|c| !c.is_empty()).unwrap_or("N/A");
  let message = truncate_for_list(sub.message.as_deref().unwrap_or(""));
  let badge = format!("status status-{}", sub.status.as_str());
  let date = sub
    .submitted_at
    .with_timezone(&Local)
    .format(DATE_FORMAT)
    .to_string();

  html
    .open("tr", &[])?
    .element("td", &[], &id)?
    .element("td", &[], &sub.name)?
    .open("td", &[])?
    .element("a", &[("href", mailto.as_str())], &sub.email)?
    .close("td")?
    .element("td", &[], company)?
    .element("td", &[], &message)?
    .open("td", &[])?
    .element("span", &[("class", badge.as_str())], sub.status.label())?
    .close("td")?
    .element("td", &[], &date)?
    .open("td", &[])?;

  html
    .open("form", &[("method", "post"), ("class", "status-form")])?
    .void("input", &[("type", "hidden"), ("name", "submission_id"), ("value", id.as_str())])?
    .void("input", &[("type", "hidden"), ("name", "update_status"), ("value", "1")])?
    .open("select", &[("name", "status"), ("onchange", "this.form.submit()")])?;
  for status in SubmissionStatus::ALL {
    if status == sub.status {
      html.element(
        "option",
        &[("value", status.as_str()), ("selected", "selected")],
        status.label(),
      )?;
    } else {
      html.element("option", &[("value", status.as_str())], status.label())?;
    }
  }
  html
    .close("select")?
    .open("noscript", &[])?
    .element("button", &[("type", "submit"), ("class", "btn btn-primary")], "Update")?
    .close("noscript")?
    .close("form")?;

  html.close("td")?.close("tr")?;
  Ok(())
}

fn stat_card(html: &mut HtmlWriter, value: u64, label: &str) -> Result<(), Error> {
  html
    .open("div", &[("class", "stat-card")])?
    .element("div", &[("class", "stat-number")], &value.to_string())?
    .element("div", &[], label)?
    .close("div")?;
  Ok(())
}

fn page_start() -> Result<HtmlWriter, Error> {
  let mut html = HtmlWriter::document()?;
  html
    .open("html", &[("lang", "en")])?
    .open("head", &[])?
    .void("meta", &[("charset", "UTF-8")])?
    .void("meta", &[
      ("name", "viewport"),
      ("content", "width=device-width, initial-scale=1.0"),
    ])?
    .element("title", &[], TITLE)?
    .void("link", &[("rel", "stylesheet"), ("href", "/assets/admin.css")])?
    .close("head")?
    .open("body", &[])?
    .open("div", &[("class", "container")])?;
  Ok(html)
}

fn page_end(mut html: HtmlWriter) -> Result<String, Error> {
  html.close("div")?.close("body")?.close("html")?;
  html.finish()
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use valance_core::submission::FormType;

  use super::*;

  fn submission(id: i64, name: &str, message: &str) -> Submission {
    Submission {
      id,
      name: name.into(),
      email: "john@example.com".into(),
      mobile: None,
      company: None,
      message: Some(message.into()),
      form_type: FormType::ContactForm,
      submitted_at: Utc::now(),
      ip_address: None,
      status: SubmissionStatus::Read,
      notes: None,
    }
  }

  fn dashboard(submissions: Vec<Submission>) -> Dashboard {
    Dashboard {
      stats: SubmissionStats { total: 7, new: 3, today: 1 },
      submissions,
    }
  }

  #[test]
  fn login_page_has_a_password_field() {
    let page = login_page().unwrap();
    assert!(page.contains(r#"name="password""#));
    assert!(!page.contains("Logout"));
  }

  #[test]
  fn dashboard_shows_counts_and_rows() {
    let page = dashboard_page(&dashboard(vec![submission(5, "John Doe", "Hello")])).unwrap();
    assert!(page.contains(r#"<div class="stat-number">7</div>"#), "{page}");
    assert!(page.contains(r#"<div class="stat-number">3</div>"#));
    assert_eq!(page.matches(r#"class="stat-card""#).count(), 3);
    assert!(page.contains("<td>John Doe</td>"));
    assert!(page.contains("<td>N/A</td>"));
    assert!(page.contains(r#"href="mailto:john@example.com""#));
    assert!(page.contains(r#"<span class="status status-read">Read</span>"#));
    assert!(page.contains(r#"<option value="read" selected="selected">Read</option>"#));
    assert!(page.contains(r#"<option value="new">New</option>"#));
  }

  #[test]
  fn empty_dashboard_says_so() {
    let page = dashboard_page(&dashboard(vec![])).unwrap();
    assert!(page.contains("No submissions yet"));
  }

  #[test]
  fn long_messages_are_truncated() {
    let long = "m".repeat(60);
    let page = dashboard_page(&dashboard(vec![submission(1, "A", &long)])).unwrap();
    assert!(page.contains(&format!("<td>{}...</td>", "m".repeat(50))));
    assert!(!page.contains(&long));
  }

  #[test]
  fn stored_markup_is_escaped_again() {
    let page = dashboard_page(&dashboard(vec![submission(1, "<i>x</i>", "&lt;b&gt;")])).unwrap();
    assert!(page.contains("&lt;i&gt;x&lt;/i&gt;"));
    assert!(page.contains("&amp;lt;b&amp;gt;"));
    assert!(!page.contains("<i>x"));
  }
}
