//! A small owned element/attribute tree for rewriting SVG markup.
//!
//! Parsing goes through `roxmltree`; serialization re-escapes every text and
//! attribute value, so values containing quotes or angle brackets survive a
//! rewrite. Processing instructions and the DOCTYPE are not kept.

use std::collections::HashSet;
use std::fmt::{self, Write};

use roxmltree::{Document, ParsingOptions};

use crate::error::{ConvertError, ConvertResult};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Qualified tag name, including any namespace prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Overwrite the attribute in place, or append it when missing.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|attr| attr.name == name)?;
        Some(self.attributes.remove(index).value)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn push_child(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Visit this element and every descendant element, depth first.
    pub fn walk_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Element),
    {
        f(self);
        for child in &mut self.children {
            if let Node::Element(element) = child {
                element.walk_mut(f);
            }
        }
    }

    /// Visit this element and every descendant element, depth first.
    pub fn walk<F>(&self, f: &mut F)
    where
        F: FnMut(&Element),
    {
        f(self);
        for element in self.child_elements() {
            element.walk(f);
        }
    }

    fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "<{}", self.name)?;
        for attr in &self.attributes {
            write!(out, " {}=\"{}\"", attr.name, escape_attribute(&attr.value))?;
        }
        if self.children.is_empty() {
            return out.write_str("/>");
        }
        out.write_char('>')?;
        for child in &self.children {
            child.write_to(out)?;
        }
        write!(out, "</{}>", self.name)
    }
}

impl Node {
    fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        match self {
            Node::Element(element) => element.write_to(out),
            Node::Text(text) => out.write_str(&escape_text(text)),
            Node::Comment(text) => write!(out, "<!--{text}-->"),
        }
    }
}

/// A parsed SVG document with an `<svg>` root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgDocument {
    declaration: Option<String>,
    prolog: Vec<Node>,
    root: Element,
}

impl SvgDocument {
    /// Parse markup, failing with [`ConvertError::MalformedMarkup`] when it is
    /// not well formed or its root element is not `<svg>`.
    pub fn parse(markup: &str) -> ConvertResult<Self> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let document = Document::parse_with_options(markup, options)
            .map_err(|err| ConvertError::MalformedMarkup(err.to_string()))?;

        let root_node = document.root_element();
        if root_node.tag_name().name() != "svg" {
            return Err(ConvertError::MalformedMarkup(format!(
                "expected an <svg> root element, found <{}>",
                root_node.tag_name().name()
            )));
        }

        let prolog = document
            .root()
            .children()
            .take_while(|node| *node != root_node)
            .filter(|node| node.is_comment())
            .map(|node| Node::Comment(node.text().unwrap_or_default().to_string()))
            .collect();

        Ok(Self {
            declaration: xml_declaration(markup),
            prolog,
            root: convert_element(root_node),
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }
}

impl fmt::Display for SvgDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(declaration) = &self.declaration {
            writeln!(f, "{declaration}")?;
        }
        for node in &self.prolog {
            node.write_to(f)?;
            f.write_char('\n')?;
        }
        self.root.write_to(f)?;
        f.write_char('\n')
    }
}

fn xml_declaration(markup: &str) -> Option<String> {
    let trimmed = markup.trim_start_matches('\u{feff}').trim_start();
    if !trimmed.starts_with("<?xml") {
        return None;
    }
    let end = trimmed.find("?>")?;
    Some(trimmed[..end + 2].to_string())
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let name = qualify(node, tag.namespace(), tag.name());

    let inherited: HashSet<(Option<&str>, &str)> = node
        .parent_element()
        .map(|parent| parent.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    let mut attributes = Vec::new();
    for ns in node.namespaces() {
        if ns.uri() == XML_NAMESPACE || inherited.contains(&(ns.name(), ns.uri())) {
            continue;
        }
        let name = match ns.name() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        attributes.push(Attribute {
            name,
            value: ns.uri().to_string(),
        });
    }
    for attr in node.attributes() {
        attributes.push(Attribute {
            name: qualify(node, attr.namespace(), attr.name()),
            value: attr.value().to_string(),
        });
    }

    let mut children = Vec::new();
    for child in node.children() {
        if child.is_element() {
            children.push(Node::Element(convert_element(child)));
        } else if child.is_text() {
            children.push(Node::Text(child.text().unwrap_or_default().to_string()));
        } else if child.is_comment() {
            children.push(Node::Comment(child.text().unwrap_or_default().to_string()));
        }
    }

    Element {
        name,
        attributes,
        children,
    }
}

fn qualify(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    let prefix = match namespace {
        Some(XML_NAMESPACE) => Some("xml"),
        Some(uri) => node.lookup_prefix(uri),
        None => None,
    };
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

fn escape_text(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(raw: &str) -> String {
    escape_text(raw).replace('"', "&quot;")
}
