//! Structural XML pass shared by the importers.
//!
//! quick-xml streams events without building a tree and stops quietly at
//! end of input, so well-formedness beyond single tags is enforced here:
//! one root, every element closed, no stray text, legal names, a leading
//! `1.x` declaration, and no `--` in comments.

use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Reader;

use super::ImportError;

/// One element of the document, in start-tag order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Tag name exactly as written, prefix included.
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Concatenated text and CDATA children. Descendants' text is not included.
    pub text: String,
}

impl XmlElement {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse `xml` into its elements, or fail with `ImportError::MalformedXml`.
pub fn read_elements(xml: &str) -> Result<Vec<XmlElement>, ImportError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);

    let mut elements: Vec<XmlElement> = Vec::new();
    // (index into `elements`, tag name) for every open element
    let mut open: Vec<(usize, String)> = Vec::new();
    let mut seen_root = false;
    let mut first_event = true;

    loop {
        let event = reader.read_event().map_err(|e| {
            malformed(format!("{e} at byte {}", reader.error_position()))
        })?;
        let at_start = std::mem::replace(&mut first_event, false);

        match event {
            Event::Start(ref start) => {
                check_single_root(open.is_empty(), &mut seen_root)?;
                let element = element_from(start)?;
                open.push((elements.len(), element.name.clone()));
                elements.push(element);
            }
            Event::Empty(ref start) => {
                check_single_root(open.is_empty(), &mut seen_root)?;
                elements.push(element_from(start)?);
            }
            Event::End(ref end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                match open.pop() {
                    Some((_, expected)) if expected == name => {}
                    Some((_, expected)) => {
                        return Err(malformed(format!(
                            "expected </{expected}>, found </{name}>"
                        )))
                    }
                    None => return Err(malformed(format!("unexpected </{name}>"))),
                }
            }
            Event::Text(ref text) => {
                if contains(text, b"]]>") {
                    return Err(malformed("\"]]>\" outside a CDATA section".into()));
                }
                let text = text
                    .unescape()
                    .map_err(|e| malformed(format!("bad text content: {e}")))?;
                append_text(&mut elements, &open, &text)?;
            }
            Event::CData(ref cdata) => {
                let text = std::str::from_utf8(cdata)
                    .map_err(|e| malformed(format!("bad CDATA section: {e}")))?;
                append_text(&mut elements, &open, text)?;
            }
            Event::Decl(ref decl) => {
                if !at_start || !xml.starts_with("<?xml") {
                    return Err(malformed(
                        "XML declaration allowed only at the start of the document".into(),
                    ));
                }
                check_declaration(decl)?;
            }
            Event::Comment(ref comment) => {
                if contains(comment, b"--") || comment.ends_with(b"-") {
                    return Err(malformed("\"--\" inside a comment".into()));
                }
            }
            Event::Eof => break,
            // Processing instructions and DOCTYPE carry no data.
            _ => {}
        }
    }

    if let Some((_, name)) = open.last() {
        return Err(malformed(format!("unclosed element <{name}>")));
    }
    if !seen_root {
        return Err(malformed("document has no root element".into()));
    }

    Ok(elements)
}

fn malformed(detail: String) -> ImportError {
    ImportError::MalformedXml(detail)
}

fn check_single_root(at_top_level: bool, seen_root: &mut bool) -> Result<(), ImportError> {
    if at_top_level {
        if *seen_root {
            return Err(malformed("more than one root element".into()));
        }
        *seen_root = true;
    }
    Ok(())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// XML `Name`: a letter, `_` or `:` first, then letters, digits, `.`, `-`,
/// `_`, `:` or middle dot.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '\u{b7}'))
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement, ImportError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    if !is_xml_name(&name) {
        return Err(malformed(format!("invalid element name <{name}>")));
    }
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(format!("bad attribute on <{name}>: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if !is_xml_name(&key) {
            return Err(malformed(format!("invalid attribute name {key:?} on <{name}>")));
        }
        let value = attr
            .unescape_value()
            .map_err(|e| malformed(format!("bad attribute value on <{name}>: {e}")))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name,
        attributes,
        text: String::new(),
    })
}

fn append_text(
    elements: &mut [XmlElement],
    open: &[(usize, String)],
    text: &str,
) -> Result<(), ImportError> {
    match open.last() {
        Some((index, _)) => {
            elements[*index].text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(malformed("text outside the root element".into())),
    }
}

/// `<?xml version=".." encoding=".."?>`: version must be `1.x`, and an
/// encoding label must follow the XML `EncName` production.
fn check_declaration(decl: &BytesDecl<'_>) -> Result<(), ImportError> {
    let version = decl
        .version()
        .map_err(|e| malformed(format!("bad XML declaration: {e}")))?;
    let supported = version
        .strip_prefix(b"1.")
        .is_some_and(|minor| !minor.is_empty() && minor.iter().all(u8::is_ascii_digit));
    if !supported {
        return Err(malformed(format!(
            "unsupported XML version \"{}\"",
            String::from_utf8_lossy(&version)
        )));
    }

    if let Some(encoding) = decl.encoding() {
        let encoding = encoding.map_err(|e| malformed(format!("bad XML declaration: {e}")))?;
        let valid = match encoding.split_first() {
            Some((first, rest)) => {
                first.is_ascii_alphabetic()
                    && rest
                        .iter()
                        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
            }
            None => false,
        };
        if !valid {
            return Err(malformed(format!(
                "invalid encoding declaration \"{}\"",
                String::from_utf8_lossy(&encoding)
            )));
        }
    }
    Ok(())
}
