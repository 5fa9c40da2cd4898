//! Element tree for Treasury XML feeds.
//!
//! The feeds are Atom documents wrapping OData properties, and the namespace
//! prefixes on their tags are not consistent between feeds. Lookups therefore
//! match on the *suffix* of the tag name as written (`m:properties`,
//! `d:BC_5YEAR`, ...) rather than on a resolved qualified name.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{FeedError, FeedResult};

/// A parsed XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written, including any namespace prefix.
    pub tag: String,
    /// Attributes as `(name, value)`, names as written.
    pub attributes: Vec<(String, String)>,
    /// Text appearing before the first child element, if any.
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Trimmed text content, empty when the element has none.
    pub fn trimmed_text(&self) -> &str {
        self.text.as_deref().map(str::trim).unwrap_or("")
    }

    /// Value of the first attribute whose name ends with `suffix`.
    pub fn attribute_with_suffix(&self, suffix: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name.ends_with(suffix))
            .map(|(_, value)| value.as_str())
    }

    /// Whether the element is explicitly marked `null="true"`, as OData does
    /// for values that have not been published.
    pub fn is_null(&self) -> bool {
        self.attribute_with_suffix("null")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    fn push_text(&mut self, text: &str) {
        // Only text before the first child counts as the element's own text.
        if self.children.is_empty() {
            self.text.get_or_insert_with(String::new).push_str(text);
        }
    }

    fn from_start(start: &BytesStart<'_>) -> FeedResult<Self> {
        let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            element.attributes.push((name, value));
        }
        Ok(element)
    }
}

/// Parse a feed body into its root element.
pub fn parse(bytes: &[u8]) -> FeedResult<Element> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| FeedError::Malformed("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    let bytes = data.into_inner();
                    let text: Cow<'_, str> = String::from_utf8_lossy(&bytes);
                    current.push_text(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(FeedError::Malformed(format!("unclosed element <{}>", open.tag)));
    }
    root.ok_or_else(|| FeedError::Malformed("document has no root element".to_string()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> FeedResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(FeedError::Malformed(format!(
                "multiple root elements, second is <{}>",
                element.tag
            )))
        }
    }
    Ok(())
}

/// Direct children of `node` whose tag ends with `suffix`, in document order.
pub fn children_with_suffix<'a>(
    node: &'a Element,
    suffix: &'a str,
) -> impl Iterator<Item = &'a Element> + 'a {
    node.children.iter().filter(move |c| c.tag.ends_with(suffix))
}

/// The single direct child of `node` whose tag ends with `suffix`.
///
/// Zero or several matches mean the feed layout is not what we expect, which
/// is reported as [`FeedError::Structure`] rather than guessed around.
pub fn unique_child_with_suffix<'a>(node: &'a Element, suffix: &str) -> FeedResult<&'a Element> {
    let matches: Vec<&'a Element> = node
        .children
        .iter()
        .filter(|c| c.tag.ends_with(suffix))
        .collect();
    match matches.as_slice() {
        [only] => Ok(*only),
        _ => Err(FeedError::Structure {
            parent: node.tag.clone(),
            suffix: suffix.to_string(),
            count: matches.len(),
        }),
    }
}

/// The last `entry` child of `root`.
///
/// Feeds list entries chronologically, so this is the latest reporting date.
/// `None` means the feed has no entries yet (e.g. early in a new month).
pub fn last_entry(root: &Element) -> Option<&Element> {
    children_with_suffix(root, "entry").last()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<feed xml:base="https://home.treasury.gov/" xmlns="http://www.w3.org/2005/Atom"
      xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices"
      xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata">
  <title type="text">DailyTreasuryYieldCurveRateData</title>
  <entry>
    <id>first</id>
    <content type="application/xml">
      <m:properties>
        <d:NEW_DATE m:type="Edm.DateTime">2024-01-02T00:00:00</d:NEW_DATE>
      </m:properties>
    </content>
  </entry>
  <atom:entry xmlns:atom="http://www.w3.org/2005/Atom">
    <id>second</id>
  </atom:entry>
</feed>"#;

    #[test]
    fn test_parse_builds_tree() {
        let root = parse(FEED.as_bytes()).unwrap();
        assert_eq!(root.tag, "feed");
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[0].tag, "title");
        assert_eq!(root.children[0].trimmed_text(), "DailyTreasuryYieldCurveRateData");
        assert_eq!(root.children[0].attribute_with_suffix("type"), Some("text"));
    }

    #[test]
    fn test_parse_unescapes_text() {
        let root = parse(b"<a><b>x &amp; y</b><c><![CDATA[<raw>]]></c></a>").unwrap();
        assert_eq!(root.children[0].trimmed_text(), "x & y");
        assert_eq!(root.children[1].trimmed_text(), "<raw>");
    }

    #[test]
    fn test_text_is_leading_text_only() {
        let root = parse(b"<a>head<b/>tail</a>").unwrap();
        assert_eq!(root.text.as_deref(), Some("head"));
    }

    #[test]
    fn test_empty_element_has_no_text() {
        let root = parse(b"<a><d:DATE/></a>").unwrap();
        assert_eq!(root.children[0].text, None);
        assert_eq!(root.children[0].trimmed_text(), "");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse(b"<a><b></a>").is_err());
        assert!(parse(b"<a><b>").is_err());
        assert!(parse(b"").is_err());
        assert!(parse(b"<a/><b/>").is_err());
        assert!(parse(b"<html>Service Unavailable").is_err());
    }

    #[test]
    fn test_last_entry_ignores_prefix() {
        let root = parse(FEED.as_bytes()).unwrap();
        let entry = last_entry(&root).unwrap();
        assert_eq!(entry.tag, "atom:entry");
        assert_eq!(entry.children[0].trimmed_text(), "second");
    }

    #[test]
    fn test_last_entry_direct_children_only() {
        let root = Element::new("feed")
            .with_child(Element::new("entry").with_text("top"))
            .with_child(Element::new("wrapper").with_child(Element::new("entry")));
        assert_eq!(last_entry(&root).unwrap().trimmed_text(), "top");
    }

    #[test]
    fn test_last_entry_none_when_no_entries() {
        let root = parse(b"<feed><title>empty</title></feed>").unwrap();
        assert!(last_entry(&root).is_none());
    }

    #[test]
    fn test_children_with_suffix_is_case_sensitive() {
        let node = Element::new("p")
            .with_child(Element::new("d:BC_5YEAR"))
            .with_child(Element::new("d:bc_5year"))
            .with_child(Element::new("BC_5YEAR"));
        let tags: Vec<_> = children_with_suffix(&node, "5YEAR").map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["d:BC_5YEAR", "BC_5YEAR"]);
    }

    #[test]
    fn test_unique_child_found() {
        let node = Element::new("entry")
            .with_child(Element::new("id"))
            .with_child(Element::new("content"));
        assert_eq!(unique_child_with_suffix(&node, "content").unwrap().tag, "content");
    }

    #[test]
    fn test_unique_child_missing() {
        let node = Element::new("entry").with_child(Element::new("id"));
        match unique_child_with_suffix(&node, "content") {
            Err(FeedError::Structure { parent, suffix, count }) => {
                assert_eq!(parent, "entry");
                assert_eq!(suffix, "content");
                assert_eq!(count, 0);
            }
            other => panic!("expected structure error, got {:?}", other),
        }
    }

    #[test]
    fn test_unique_child_duplicated() {
        let node = Element::new("content")
            .with_child(Element::new("m:properties"))
            .with_child(Element::new("properties"))
            .with_child(Element::new("x:properties"));
        match unique_child_with_suffix(&node, "properties") {
            Err(FeedError::Structure { count, .. }) => assert_eq!(count, 3),
            other => panic!("expected structure error, got {:?}", other),
        }
    }

    #[test]
    fn test_null_attribute() {
        let null = Element::new("d:BC_30YEAR").with_attribute("m:null", "true");
        assert!(null.is_null());
        assert!(!Element::new("d:BC_30YEAR").is_null());
        assert!(!Element::new("d:BC_30YEAR").with_attribute("m:null", "false").is_null());
    }
}
