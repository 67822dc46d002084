//! Minimal XML element tree for libvirt descriptors.
//!
//! Descriptors are small, so they are read fully into an [`Element`] tree with
//! `quick-xml` and then walked by path. Nothing outside this module touches
//! `quick-xml` events.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{DriverError, Result};

/// One XML element with its attributes, child elements and text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Parse a document and return its root element.
    pub fn parse(xml: &str) -> Result<Element> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        // Open elements; the bottom entry collects the root.
        let mut stack: Vec<Element> = vec![Element::default()];

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    stack.push(Element::from_start(e)?);
                }
                Event::Empty(ref e) => {
                    let element = Element::from_start(e)?;
                    push_child(&mut stack, element)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        DriverError::Xml("unbalanced end tag".to_string())
                    })?;
                    push_child(&mut stack, element)?;
                }
                Event::Text(ref t) => {
                    let text = t.unescape()?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                Event::CData(ref c) => {
                    let text = String::from_utf8_lossy(&c[..]).to_string();
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if stack.len() != 1 {
            return Err(DriverError::Xml("unexpected end of document".to_string()));
        }

        stack
            .pop()
            .and_then(|document| document.children.into_iter().next())
            .ok_or_else(|| DriverError::Xml("document has no root element".to_string()))
    }

    /// Parse a document and check the root element's name.
    pub fn parse_root(xml: &str, root: &str) -> Result<Element> {
        let element = Element::parse(xml)?;
        if element.name != root {
            return Err(DriverError::Xml(format!(
                "expected <{}> root element, found <{}>",
                root, element.name
            )));
        }
        Ok(element)
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Element> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).to_string();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
            let value = attr.unescape_value()?.to_string();
            attributes.push((key, value));
        }

        Ok(Element {
            name,
            attributes,
            ..Default::default()
        })
    }

    /// Value of attribute `name`, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text content directly inside this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// First child named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children named `name`, in document order.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Attribute `attr` of the first child named `name`.
    pub fn child_attr(&self, name: &str, attr: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.attr(attr))
    }
}

fn push_child(stack: &mut [Element], element: Element) -> Result<()> {
    let parent = stack
        .last_mut()
        .ok_or_else(|| DriverError::Xml("unbalanced end tag".to_string()))?;
    parent.children.push(element);
    Ok(())
}

/// Escape a value for use in an attribute or text node.
pub fn escape_value(value: &str) -> String {
    escape(value).into_owned()
}
