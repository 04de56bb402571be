//! Ordered attribute lists and HTML serialisation for generated tags.

/// Value of a single tag attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
  /// Rendered as `name="value"`, HTML-escaped.
  Text(String),
  /// `true` renders as `name="name"`; `false` drops the attribute.
  Flag(bool),
}

impl From<&str> for AttrValue {
  fn from(value: &str) -> Self {
    Self::Text(value.to_string())
  }
}

impl From<String> for AttrValue {
  fn from(value: String) -> Self {
    Self::Text(value)
  }
}

impl From<bool> for AttrValue {
  fn from(value: bool) -> Self {
    Self::Flag(value)
  }
}

/// Attributes in insertion order; overriding a name keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Attributes {
  entries: Vec<(String, AttrValue)>,
}

impl Attributes {
  pub(crate) fn set(&mut self, name: &str, value: impl Into<AttrValue>) {
    let value = value.into();
    match self.entries.iter_mut().find(|(key, _)| key == name) {
      Some((_, existing)) => *existing = value,
      None => self.entries.push((name.to_string(), value)),
    }
  }

  pub(crate) fn remove(&mut self, name: &str) {
    self.entries.retain(|(key, _)| key != name);
  }

  pub(crate) fn get(&self, name: &str) -> Option<&AttrValue> {
    self
      .entries
      .iter()
      .find(|(key, _)| key == name)
      .map(|(_, value)| value)
  }

  /// Text value of an attribute that will actually be rendered.
  pub(crate) fn text(&self, name: &str) -> Option<&str> {
    let (key, value) = self.entries.iter().find(|(key, _)| key == name)?;
    match value {
      AttrValue::Text(value) => Some(value.as_str()),
      AttrValue::Flag(true) => Some(key.as_str()),
      AttrValue::Flag(false) => None,
    }
  }

  pub(crate) fn is_present(&self, name: &str) -> bool {
    self.text(name).is_some()
  }

  fn render(&self) -> String {
    let mut out = String::new();
    for (name, value) in &self.entries {
      let rendered = match value {
        AttrValue::Text(text) => text.as_str(),
        AttrValue::Flag(true) => name.as_str(),
        AttrValue::Flag(false) => continue,
      };
      out.push(' ');
      out.push_str(name);
      out.push_str("=\"");
      out.push_str(&escape_html(rendered));
      out.push('"');
    }
    out
  }
}

/// Element with content and a closing tag, e.g. `<script ...></script>`.
pub(crate) fn content_tag(name: &str, attributes: &Attributes) -> String {
  format!("<{name}{}></{name}>", attributes.render())
}

/// Void element, e.g. `<link ...>`.
pub(crate) fn void_tag(name: &str, attributes: &Attributes) -> String {
  format!("<{name}{}>", attributes.render())
}

pub(crate) fn escape_html(value: &str) -> String {
  let mut escaped = String::with_capacity(value.len());
  for c in value.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&#39;"),
      other => escaped.push(other),
    }
  }
  escaped
}
