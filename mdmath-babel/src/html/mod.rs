//! HTML helpers shared by the preview, bridge and export paths
//!
//! We use the `html5ever` + `markup5ever_rcdom` pair for parsing and serialization, the
//! same browser-grade parser used for HTML export. Everything here works on complete
//! documents: fragments are wrapped with [`wrap_document`] before parsing so the parser
//! never has to guess a context element.

pub mod css;
pub mod inline;

pub use css::{StyleRule, StyleSheet};
pub use inline::inline_styles_in_html;

use crate::error::RenderError;
use html5ever::tendril::TendrilSink;
use html5ever::{
    ns, parse_document as parse_html, serialize, serialize::SerializeOpts,
    serialize::TraversalScope, Attribute, LocalName, QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Elements whose text is never treated as prose
pub(crate) const RAW_TEXT_ELEMENTS: &[&str] = &["code", "pre", "script", "style", "kbd", "samp"];

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure", "h1", "h2", "h3",
    "h4", "h5", "h6", "hr", "li", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Wrap a body fragment in a complete UTF-8 HTML document
pub fn wrap_document(body_html: &str, head_html: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">{head_html}</head><body>{body_html}</body></html>"
    )
}

/// Parse a complete HTML document
pub fn parse_document(html: &str) -> RcDom {
    parse_html(RcDom::default(), Default::default()).one(html)
}

/// Parse a body fragment into detached nodes ready to graft into another tree
pub fn parse_fragment(html: &str) -> Vec<Handle> {
    let dom = parse_document(&wrap_document(html, ""));
    let Some(body) = body(&dom) else {
        return Vec::new();
    };
    let nodes = std::mem::take(&mut *body.children.borrow_mut());
    for node in &nodes {
        node.parent.set(None);
    }
    nodes
}

/// Depth-first search for the first element with the given local name
pub fn find_element(node: &Handle, name: &str) -> Option<Handle> {
    if element_name(node).as_deref() == Some(name) {
        return Some(node.clone());
    }
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, name))
}

/// The `<body>` element of a parsed document
pub fn body(dom: &RcDom) -> Option<Handle> {
    find_element(&dom.document, "body")
}

/// Lowercase local name for element nodes
pub fn element_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_ascii_lowercase().to_string()),
        _ => None,
    }
}

pub fn get_attr(node: &Handle, attr: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == attr)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Set an attribute, replacing any previous value
pub fn set_attr(node: &Handle, attr: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        if let Some(existing) = attrs.iter_mut().find(|a| &*a.name.local == attr) {
            existing.value = value.to_string().into();
        } else {
            attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(attr)),
                value: value.to_string().into(),
            });
        }
    }
}

pub fn remove_attr(node: &Handle, attr: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        attrs.borrow_mut().retain(|a| &*a.name.local != attr);
    }
}

/// Create an HTML element with attributes
pub fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Serialize the children of a node (the node itself is left out)
pub fn serialize_children(node: &Handle) -> Result<String, RenderError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    for child in node.children.borrow().iter() {
        let serializable = SerializableHandle::from(child.clone());
        serialize(&mut output, &serializable, opts.clone())
            .map_err(|e| RenderError::Html(format!("HTML serialization failed: {e}")))?;
    }

    String::from_utf8(output).map_err(|e| RenderError::Html(format!("UTF-8 conversion failed: {e}")))
}

/// Serialize a whole document, doctype included
pub fn serialize_document(dom: &RcDom) -> Result<String, RenderError> {
    let mut output = Vec::new();
    let serializable = SerializableHandle::from(dom.document.clone());
    serialize(&mut output, &serializable, SerializeOpts::default())
        .map_err(|e| RenderError::Html(format!("HTML serialization failed: {e}")))?;
    String::from_utf8(output).map_err(|e| RenderError::Html(format!("UTF-8 conversion failed: {e}")))
}

/// Serialize only what sits inside `<body>`
pub fn body_html(dom: &RcDom) -> Result<String, RenderError> {
    let body = body(dom).ok_or_else(|| RenderError::Html("document has no body".to_string()))?;
    serialize_children(&body)
}

/// Visible text of an HTML document, with block boundaries as line breaks
pub fn text_content(html: &str) -> String {
    let dom = parse_document(html);
    let mut output = String::new();
    if let Some(body) = body(&dom) {
        collect_text(&body, &mut output);
    }
    output.trim_matches('\n').to_string()
}

fn collect_text(node: &Handle, output: &mut String) {
    match &node.data {
        NodeData::Text { contents } => output.push_str(&contents.borrow()),
        NodeData::Element { .. } => {
            let name = element_name(node).unwrap_or_default();
            if matches!(name.as_str(), "script" | "style" | "head") {
                return;
            }
            if name == "br" {
                output.push('\n');
                return;
            }
            let block = BLOCK_ELEMENTS.contains(&name.as_str());
            if block && !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            for child in node.children.borrow().iter() {
                collect_text(child, output);
            }
            if block && !output.ends_with('\n') {
                output.push('\n');
            }
        }
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, output);
            }
        }
    }
}

/// Escape HTML special characters in text
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Undo the entity encoding a Markdown renderer applies to text
pub fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}
