//! Canonical element trees for comparing XML documents.
//!
//! Two documents are equal when they have the same elements, the same
//! attribute maps (after unescaping) and the same trimmed text. Quote style,
//! entity spelling, `<a/>` against `<a></a>`, comments and declarations make
//! no difference.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesStart, Event};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanonicalError {
    #[error("XML parse error: {0}")]
    Parse(String),
    #[error("Unclosed element <{0}>")]
    Unclosed(String),
    #[error("Closing tag </{0}> without an opening tag")]
    UnexpectedEnd(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    /// All direct text of the element, joined and trimmed.
    pub text: String,
    pub children: Vec<XmlElement>,
}

/// Parse `xml` into its top-level elements. A document with no elements
/// gives an empty list.
pub fn canonicalize(xml: &str) -> Result<Vec<XmlElement>, CanonicalError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut roots = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| CanonicalError::Parse(e.to_string()))?;
        match event {
            Event::Start(e) => stack.push(element_from(&e)?),
            Event::Empty(e) => {
                let element = element_from(&e)?;
                attach(element, &mut stack, &mut roots);
            }
            Event::End(e) => {
                let element = stack.pop().ok_or_else(|| {
                    CanonicalError::UnexpectedEnd(String::from_utf8_lossy(e.name().as_ref()).into())
                })?;
                attach(element, &mut stack, &mut roots);
            }
            Event::Text(e) => {
                if let Some(current) = stack.last_mut() {
                    let text = e.decode().map_err(|e| CanonicalError::Parse(e.to_string()))?;
                    current.text.push_str(&text);
                }
            }
            Event::GeneralRef(e) => {
                if let Some(current) = stack.last_mut() {
                    let raw = e.decode().map_err(|e| CanonicalError::Parse(e.to_string()))?;
                    current.text.push_str(&resolve_entity(&raw)?);
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            // Comments, declarations, processing instructions, doctypes.
            _ => {}
        }
    }

    match stack.pop() {
        Some(open) => Err(CanonicalError::Unclosed(open.name)),
        None => Ok(roots),
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement, CanonicalError> {
    let mut attributes = BTreeMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CanonicalError::Parse(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| CanonicalError::Parse(e.to_string()))?
            .into_owned();
        attributes.insert(key, value);
    }

    Ok(XmlElement {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        attributes,
        ..XmlElement::default()
    })
}

fn attach(mut element: XmlElement, stack: &mut [XmlElement], roots: &mut Vec<XmlElement>) {
    element.text = element.text.trim().to_string();
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => roots.push(element),
    }
}

fn resolve_entity(raw: &str) -> Result<String, CanonicalError> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Ok(resolved.into());
    }

    let invalid = || CanonicalError::Parse(format!("Invalid entity: &{raw};"));
    let rest = raw.strip_prefix('#').ok_or_else(invalid)?;
    let code = match rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).map_err(|_| invalid())?,
        None => rest.parse::<u32>().map_err(|_| invalid())?,
    };
    char::from_u32(code)
        .map(|ch| ch.to_string())
        .ok_or_else(invalid)
}
