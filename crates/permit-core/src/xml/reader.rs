//! XML document reader

use super::element::XmlElement;
use crate::error::{CoreError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Read a document into an owned element tree and return the root element.
///
/// Declarations, comments, processing instructions and doctypes are skipped.
/// Whitespace-only text is ignored.
pub(crate) fn read_document(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut open: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| malformed(&reader, e))?;

        match event {
            Event::Start(start) => open.push(element_from_start(&start)?),
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(&mut open, &mut root, element)?;
            }
            Event::End(_) => {
                let element = open.pop().ok_or_else(|| {
                    CoreError::MalformedXml("closing tag without opening tag".to_string())
                })?;
                attach(&mut open, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| malformed(&reader, e))?;
                append_text(&mut open, &text)?;
            }
            Event::CData(data) => {
                let text = String::from_utf8(data.into_inner().into_owned())
                    .map_err(|e| CoreError::MalformedXml(e.to_string()))?;
                append_text(&mut open, &text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(CoreError::MalformedXml(format!(
            "element <{}> is not closed",
            unclosed.name()
        )));
    }

    let root = root.ok_or_else(|| CoreError::MalformedXml("document has no root element".to_string()))?;
    log::trace!("read XML document with root <{}>", root.name());
    Ok(root)
}

fn malformed(reader: &Reader<&[u8]>, error: impl std::fmt::Display) -> CoreError {
    CoreError::MalformedXml(format!(
        "{} at position {}",
        error,
        reader.buffer_position()
    ))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| CoreError::MalformedXml(e.to_string()))?
        .to_string();
    let mut element = XmlElement::new(name);

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| CoreError::MalformedXml(e.to_string()))?;
        let key = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|e| CoreError::MalformedXml(e.to_string()))?
            .to_string();
        let value = attribute
            .unescape_value()
            .map_err(|e| CoreError::MalformedXml(e.to_string()))?;
        element.set_attribute(key, value.into_owned());
    }

    Ok(element)
}

fn attach(
    open: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    if let Some(parent) = open.last_mut() {
        parent.push_child(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(CoreError::UnexpectedXml(format!(
            "second root element <{}>",
            element.name()
        )));
    }
    *root = Some(element);
    Ok(())
}

fn append_text(open: &mut [XmlElement], text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }
    match open.last_mut() {
        Some(current) => {
            current.append_text(text);
            Ok(())
        }
        None => Err(CoreError::UnexpectedXml(format!(
            "text outside of root element: {}",
            text.trim()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_nested_document() -> anyhow::Result<()> {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <!-- rule -->
            <boolean operator="or">
                <boolean operator="true"/>
                <condition field="user" operator="=" value="alice"></condition>
            </boolean>"#;

        let root = read_document(xml)?;
        assert_eq!(root.name(), "boolean");
        assert_eq!(root.attribute("operator"), Some("or"));
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.children()[1].attribute("value"), Some("alice"));
        Ok(())
    }

    #[test]
    fn test_read_unescapes_values() -> anyhow::Result<()> {
        let root = read_document(r#"<note value="a&lt;b">x &amp; y</note>"#)?;
        assert_eq!(root.attribute("value"), Some("a<b"));
        assert_eq!(root.text(), Some("x & y"));
        Ok(())
    }

    #[test]
    fn test_read_rejects_unclosed_element() {
        let result = read_document(r#"<boolean operator="and"><boolean operator="true"/>"#);
        assert!(matches!(result, Err(CoreError::MalformedXml(_))));
    }

    #[test]
    fn test_read_rejects_mismatched_end_tag() {
        let result = read_document(r#"<a><b></a></b>"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_read_rejects_empty_document() {
        let result = read_document("   ");
        assert!(matches!(result, Err(CoreError::MalformedXml(_))));
    }

    #[test]
    fn test_read_rejects_second_root() {
        let result = read_document("<a/><b/>");
        assert!(matches!(result, Err(CoreError::UnexpectedXml(_))));
    }

    #[test]
    fn test_written_element_reads_back() -> anyhow::Result<()> {
        let element = XmlElement::new("boolean")
            .with_attribute("operator", "and")
            .with_child(XmlElement::new("condition").with_attribute("value", "\"x\" & <y>"));

        let read = read_document(&element.to_string())?;
        assert_eq!(read, element);
        Ok(())
    }
}
