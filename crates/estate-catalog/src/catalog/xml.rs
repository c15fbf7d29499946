//! Order-preserving tree-to-XML rendering used for `Accept: application/xml` responses.

use serde_json::Value;

pub const ROOT_TAG: &str = "response";
const LIST_ITEM_TAG: &str = "item";

/// Tagged tree independent of any particular object model.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Scalar(Option<String>),
    List(Vec<XmlNode>),
    Map(Vec<(String, XmlNode)>),
}

impl From<&Value> for XmlNode {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Scalar(None),
            Value::Bool(flag) => Self::Scalar(Some(flag.to_string())),
            Value::Number(number) => Self::Scalar(Some(number.to_string())),
            Value::String(text) => Self::Scalar(Some(text.clone())),
            Value::Array(items) => Self::List(items.iter().map(XmlNode::from).collect()),
            Value::Object(entries) => Self::Map(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), XmlNode::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Renders a complete document with `node` as the children of the root element.
pub fn to_document(node: &XmlNode) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n");
    write_element(&mut out, ROOT_TAG, node);
    out.push('\n');
    out
}

fn write_element(out: &mut String, tag: &str, node: &XmlNode) {
    match node {
        XmlNode::Scalar(None) => {
            out.push('<');
            out.push_str(tag);
            out.push_str("/>");
        }
        XmlNode::Scalar(Some(text)) if text.is_empty() => {
            out.push('<');
            out.push_str(tag);
            out.push_str("/>");
        }
        XmlNode::Scalar(Some(text)) => {
            open(out, tag);
            if text.contains('<') || text.contains('>') {
                write_cdata(out, text);
            } else {
                escape_into(out, text);
            }
            close(out, tag);
        }
        XmlNode::List(items) => {
            open(out, tag);
            for item in items {
                write_element(out, LIST_ITEM_TAG, item);
            }
            close(out, tag);
        }
        XmlNode::Map(entries) => {
            open(out, tag);
            for (key, value) in entries {
                write_element(out, &element_name(key), value);
            }
            close(out, tag);
        }
    }
}

fn open(out: &mut String, tag: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
}

fn close(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Reduces a map key to a usable element name.
fn element_name(key: &str) -> String {
    if key.parse::<u64>().is_ok() {
        return LIST_ITEM_TAG.to_string();
    }

    let cleaned: String = key
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .collect();

    match cleaned.chars().next() {
        None => LIST_ITEM_TAG.to_string(),
        Some(first) if first.is_ascii_digit() => format!("_{cleaned}"),
        Some(_) => cleaned,
    }
}

/// Characters XML 1.0 cannot carry at all, escaped or not.
fn is_xml_char(ch: char) -> bool {
    !matches!(
        ch,
        '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}'
    )
}

fn write_cdata(out: &mut String, text: &str) {
    let text: String = text.chars().filter(|ch| is_xml_char(*ch)).collect();
    out.push_str("<![CDATA[");
    // A literal terminator is split across two sections.
    out.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
    out.push_str("]]>");
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars().filter(|ch| is_xml_char(*ch)) {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
}
