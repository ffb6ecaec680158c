//! Owned XML element

use quick_xml::escape::escape;
use std::fmt;

/// An XML element with ordered attributes, child elements and optional text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
    text: Option<String>,
}

impl XmlElement {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a document and return its root element
    pub fn parse(xml: &str) -> crate::error::Result<Self> {
        super::reader::read_document(xml)
    }

    /// Set an attribute, replacing an existing value with the same key
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Append a child element
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Set the text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    pub(crate) fn append_text(&mut self, text: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an attribute value by key
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// First child element, if any
    pub fn first_child(&self) -> Option<&XmlElement> {
        self.children.first()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Serialize as compact XML without a declaration
    pub fn to_xml_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (key, value) in &self.attributes {
            write!(f, " {}=\"{}\"", key, escape(value.as_str()))?;
        }

        if self.children.is_empty() && self.text.is_none() {
            return f.write_str("/>");
        }

        f.write_str(">")?;
        if let Some(text) = &self.text {
            f.write_str(&escape(text.as_str()))?;
        }
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        write!(f, "</{}>", self.name)
    }
}
