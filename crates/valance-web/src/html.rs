//! HTML generation on top of `quick-xml`'s writer.
//!
//! Text and attribute values always go through the writer's escaping; there
//! is no way to emit raw markup. Void elements are written self-closed
//! (`<input ... />`), which HTML5 accepts.

use std::io::Cursor;

use quick_xml::{
  Writer,
  events::{BytesEnd, BytesStart, BytesText, Event},
};

use crate::error::Error;

pub struct HtmlWriter {
  writer: Writer<Cursor<Vec<u8>>>,
}

impl HtmlWriter {
  /// Start a document with `<!DOCTYPE html>`.
  pub fn document() -> Result<Self, Error> {
    let mut html = Self { writer: Writer::new(Cursor::new(Vec::new())) };
    html.emit(Event::DocType(BytesText::from_escaped("html")))?;
    Ok(html)
  }

  pub fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) -> Result<&mut Self, Error> {
    self.emit(Event::Start(start(tag, attrs)))?;
    Ok(self)
  }

  pub fn close(&mut self, tag: &str) -> Result<&mut Self, Error> {
    self.emit(Event::End(BytesEnd::new(tag)))?;
    Ok(self)
  }

  pub fn text(&mut self, text: &str) -> Result<&mut Self, Error> {
    self.emit(Event::Text(BytesText::new(text)))?;
    Ok(self)
  }

  /// A void element such as `<input>` or `<meta>`.
  pub fn void(&mut self, tag: &str, attrs: &[(&str, &str)]) -> Result<&mut Self, Error> {
    self.emit(Event::Empty(start(tag, attrs)))?;
    Ok(self)
  }

  /// `<tag attrs>text</tag>`
  pub fn element(
    &mut self,
    tag: &str,
    attrs: &[(&str, &str)],
    text: &str,
  ) -> Result<&mut Self, Error> {
    self.open(tag, attrs)?.text(text)?.close(tag)
  }

  pub fn finish(self) -> Result<String, Error> {
    String::from_utf8(self.writer.into_inner().into_inner())
      .map_err(|e| Error::Render(e.to_string()))
  }

  fn emit(&mut self, event: Event<'_>) -> Result<(), Error> {
    self
      .writer
      .write_event(event)
      .map_err(|e| Error::Render(e.to_string()))
  }
}

fn start<'a>(tag: &'a str, attrs: &[(&str, &str)]) -> BytesStart<'a> {
  let mut el = BytesStart::new(tag);
  for (k, v) in attrs {
    el.push_attribute((*k, *v));
  }
  el
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn text_and_attributes_are_escaped() {
    let mut html = HtmlWriter::document().unwrap();
    html
      .element("a", &[("href", "mailto:\"x\"@y.z")], "<b>&'")
      .unwrap();
    let out = html.finish().unwrap();
    assert!(out.starts_with("<!DOCTYPE html>"), "{out}");
    assert!(out.contains("&lt;b&gt;&amp;"), "{out}");
    assert!(out.contains("&quot;x&quot;"), "{out}");
    assert!(!out.contains("<b>"), "{out}");
  }

  #[test]
  fn void_elements_are_self_closed() {
    let mut html = HtmlWriter::document().unwrap();
    html.void("input", &[("type", "hidden"), ("name", "id")]).unwrap();
    let out = html.finish().unwrap();
    assert!(out.ends_with(r#"<input type="hidden" name="id"/>"#), "{out}");
  }
}
