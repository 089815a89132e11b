// SPDX-License-Identifier: MIT OR Apache-2.0
//! Streaming SVG reader building an [`XmlTree`].

use crate::error::{Result, SvgError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sozi_document::{AttributedTree, NodeId, NodeKind, QName, XmlTree, XML_NS};

/// Parsed document parts
pub(crate) struct Parsed {
    pub tree: XmlTree,
    pub prolog: Vec<Event<'static>>,
    pub epilog: Vec<Event<'static>>,
}

/// Parse an XML document
pub(crate) fn parse(input: &str) -> Result<Parsed> {
    let mut reader = Reader::from_str(input);
    reader.trim_text(false);

    let mut builder = TreeBuilder::default();
    loop {
        match reader.read_event()? {
            Event::Start(start) => builder.open(&start, false)?,
            Event::Empty(start) => builder.open(&start, true)?,
            Event::End(end) => {
                let name = std::str::from_utf8(end.name().as_ref())?.to_string();
                builder.close(&name)?;
            }
            Event::Eof => break,
            other => builder.content(other)?,
        }
    }
    builder.finish()
}

#[derive(Default)]
struct TreeBuilder {
    tree: Option<XmlTree>,
    open: Vec<(NodeId, String)>,
    scopes: Vec<Vec<(String, String)>>,
    prolog: Vec<Event<'static>>,
    epilog: Vec<Event<'static>>,
}

impl TreeBuilder {
    fn open(&mut self, start: &BytesStart<'_>, empty: bool) -> Result<()> {
        let raw_name = std::str::from_utf8(start.name().as_ref())?.to_string();

        let mut declarations = Vec::new();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value()?.into_owned();
            if key == "xmlns" {
                declarations.push((String::new(), value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                declarations.push((prefix.to_string(), value));
            } else {
                attributes.push((key, value));
            }
        }
        self.scopes.push(declarations);

        let name = self.resolve(&raw_name, true)?;
        let parent = self.open.last().map(|&(node, _)| node);
        let node = if let Some(tree) = self.tree.as_mut() {
            let Some(parent) = parent else {
                return Err(SvgError::TrailingElement(raw_name));
            };
            let node = tree.create_element(name);
            tree.append_child(parent, node);
            node
        } else {
            let tree = XmlTree::new(name);
            let root = tree.root();
            self.tree = Some(tree);
            root
        };

        let mut resolved = Vec::with_capacity(attributes.len());
        for (key, value) in attributes {
            resolved.push((self.resolve(&key, false)?, value));
        }

        let Some(tree) = self.tree.as_mut() else {
            return Err(SvgError::MissingRoot);
        };
        if let Some(scope) = self.scopes.last() {
            for (prefix, uri) in scope {
                if !uri.is_empty() {
                    tree.declare_namespace(prefix, uri);
                }
            }
        }
        for (qname, value) in resolved {
            tree.set_attribute(node, &qname, &value);
        }

        if empty {
            self.scopes.pop();
        } else {
            self.open.push((node, raw_name));
        }
        Ok(())
    }

    fn close(&mut self, raw_name: &str) -> Result<()> {
        match self.open.pop() {
            Some((_, open_name)) if open_name == raw_name => {
                self.scopes.pop();
                Ok(())
            }
            _ => Err(SvgError::UnexpectedEnd(raw_name.to_string())),
        }
    }

    fn content(&mut self, event: Event<'_>) -> Result<()> {
        let Some(&(parent, _)) = self.open.last() else {
            let owned = event.into_owned();
            if self.tree.is_none() {
                self.prolog.push(owned);
            } else {
                self.epilog.push(owned);
            }
            return Ok(());
        };

        let kind = match &event {
            Event::Text(text) => NodeKind::Text(std::str::from_utf8(text)?.to_string()),
            Event::CData(data) => NodeKind::CData(std::str::from_utf8(data)?.to_string()),
            Event::Comment(text) => NodeKind::Comment(std::str::from_utf8(text)?.to_string()),
            Event::PI(text) => {
                NodeKind::ProcessingInstruction(std::str::from_utf8(text)?.to_string())
            }
            _ => return Ok(()),
        };
        if let Some(tree) = self.tree.as_mut() {
            tree.append_content(parent, kind);
        }
        Ok(())
    }

    fn finish(self) -> Result<Parsed> {
        if let Some((_, name)) = self.open.last() {
            return Err(SvgError::Unclosed(name.clone()));
        }
        let tree = self.tree.ok_or(SvgError::MissingRoot)?;
        Ok(Parsed {
            tree,
            prolog: self.prolog,
            epilog: self.epilog,
        })
    }

    fn lookup(&self, prefix: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    /// Resolve a raw `prefix:local` name against the open scopes.
    ///
    /// Unprefixed attributes are never in a namespace.
    fn resolve(&self, raw: &str, is_element: bool) -> Result<QName> {
        let (prefix, local) = raw.split_once(':').unwrap_or(("", raw));
        if prefix == "xml" {
            return Ok(QName::new(XML_NS, local));
        }
        if prefix.is_empty() && !is_element {
            return Ok(QName::unqualified(local));
        }
        match self.lookup(prefix) {
            Some("") | None if prefix.is_empty() => Ok(QName::unqualified(local)),
            Some(uri) if !uri.is_empty() => Ok(QName::new(uri, local)),
            _ => Err(SvgError::UnboundPrefix(prefix.to_string())),
        }
    }
}
