// SPDX-License-Identifier: MIT OR Apache-2.0
//! Serialization of an [`XmlTree`] back to XML text.
//!
//! All namespace declarations are emitted on the root element. URIs used by
//! the tree without a declaration get their conventional prefix, or a
//! generated `nsN` one. Elements outside the default namespace redeclare it
//! locally.

use crate::error::{Result, SvgError};
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use sozi_document::{
    conventional_prefix, AttributedTree, NamespaceBinding, NodeId, NodeKind, QName, XmlTree,
    XML_NS,
};

/// Serialize a tree with the given prolog and epilog events
pub(crate) fn write(
    tree: &XmlTree,
    prolog: &[Event<'static>],
    epilog: &[Event<'static>],
) -> Result<String> {
    let names = Names::collect(tree);
    let mut writer = Writer::new(Vec::new());

    for event in prolog {
        writer.write_event(event)?;
    }
    write_node(&mut writer, tree, tree.root(), &names, names.default_uri(), true)?;
    for event in epilog {
        writer.write_event(event)?;
    }

    let bytes = writer.into_inner();
    String::from_utf8(bytes).map_err(|e| SvgError::Utf8(e.utf8_error()))
}

/// Write one node. `in_scope` is the default namespace in effect at the
/// node's position; elements that disagree with it redeclare `xmlns`.
fn write_node<'a>(
    writer: &mut Writer<Vec<u8>>,
    tree: &'a XmlTree,
    node: NodeId,
    names: &'a Names,
    in_scope: Option<&'a str>,
    is_root: bool,
) -> Result<()> {
    match tree.kind(node) {
        NodeKind::Element { name, attributes } => {
            let tag = names.element(name);
            let mut start = BytesStart::new(tag.as_str());
            let mut scope = in_scope;
            if is_root {
                for binding in &names.bindings {
                    let key = if binding.prefix.is_empty() {
                        "xmlns".to_string()
                    } else {
                        format!("xmlns:{}", binding.prefix)
                    };
                    start.push_attribute((key.as_str(), binding.uri.as_str()));
                }
            } else {
                match name.namespace.as_deref() {
                    None if in_scope.is_some() => {
                        start.push_attribute(("xmlns", ""));
                        scope = None;
                    }
                    Some(uri) if names.is_default(uri) && in_scope != Some(uri) => {
                        start.push_attribute(("xmlns", uri));
                        scope = Some(uri);
                    }
                    _ => {}
                }
            }
            for (qname, value) in attributes {
                let key = names.attribute(qname);
                start.push_attribute((key.as_str(), value.as_str()));
            }

            let children = tree.children(node);
            if children.is_empty() {
                writer.write_event(Event::Empty(start))?;
            } else {
                writer.write_event(Event::Start(start))?;
                for &child in children {
                    write_node(writer, tree, child, names, scope, false)?;
                }
                writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
            }
        }
        NodeKind::Text(text) => {
            writer.write_event(Event::Text(BytesText::from_escaped(text.as_str())))?;
        }
        NodeKind::CData(text) => {
            writer.write_event(Event::CData(BytesCData::new(text.as_str())))?;
        }
        NodeKind::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
        }
        NodeKind::ProcessingInstruction(text) => {
            writer.write_event(Event::PI(BytesText::from_escaped(text.as_str())))?;
        }
    }
    Ok(())
}

/// Prefix assignment for every namespace the tree uses
struct Names {
    bindings: Vec<NamespaceBinding>,
}

impl Names {
    fn collect(tree: &XmlTree) -> Self {
        let mut bindings = tree.namespaces().to_vec();
        for node in tree.descendants(tree.root()) {
            if let NodeKind::Element { name, attributes } = tree.kind(node) {
                ensure_bound(&mut bindings, name.namespace.as_deref(), true);
                for qname in attributes.keys() {
                    ensure_bound(&mut bindings, qname.namespace.as_deref(), false);
                }
            }
        }
        Self { bindings }
    }

    /// URI bound to the empty prefix on the root
    fn default_uri(&self) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.prefix.is_empty())
            .map(|b| b.uri.as_str())
    }

    fn is_default(&self, uri: &str) -> bool {
        self.default_uri() == Some(uri)
    }

    fn element(&self, name: &QName) -> String {
        let Some(uri) = name.namespace.as_deref() else {
            return name.local.clone();
        };
        if uri == XML_NS {
            return format!("xml:{}", name.local);
        }
        if self.is_default(uri) {
            return name.local.clone();
        }
        self.prefixed(uri, &name.local)
    }

    fn attribute(&self, name: &QName) -> String {
        match name.namespace.as_deref() {
            None => name.local.clone(),
            Some(XML_NS) => format!("xml:{}", name.local),
            Some(uri) => self.prefixed(uri, &name.local),
        }
    }

    fn prefixed(&self, uri: &str, local: &str) -> String {
        match self
            .bindings
            .iter()
            .find(|b| !b.prefix.is_empty() && b.uri == uri)
        {
            Some(binding) => format!("{}:{}", binding.prefix, local),
            None => local.to_string(),
        }
    }
}

/// Add a binding for `uri` unless one usable in this position exists
fn ensure_bound(bindings: &mut Vec<NamespaceBinding>, uri: Option<&str>, element: bool) {
    let Some(uri) = uri else {
        return;
    };
    if uri == XML_NS {
        return;
    }
    let bound = bindings
        .iter()
        .any(|b| b.uri == uri && (element || !b.prefix.is_empty()));
    if bound {
        return;
    }

    let base = conventional_prefix(uri).unwrap_or("ns");
    let mut prefix = base.to_string();
    let mut n = 1;
    while bindings.iter().any(|b| b.prefix == prefix) {
        prefix = format!("{base}{n}");
        n += 1;
    }
    tracing::debug!("Binding namespace {} to prefix {}", uri, prefix);
    bindings.push(NamespaceBinding {
        prefix,
        uri: uri.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use sozi_document::{SOZI_NS, SVG_NS};

    fn svg_tree() -> XmlTree {
        let mut tree = XmlTree::new(QName::svg("svg"));
        tree.declare_namespace("", SVG_NS);
        tree
    }

    #[test]
    fn test_writes_default_namespace_unprefixed() {
        let mut tree = svg_tree();
        let g = tree.create_element(QName::svg("g"));
        let root = tree.root();
        tree.append_child(root, g);
        tree.set_attribute(g, &QName::unqualified("id"), "layer1");

        let xml = write(&tree, &[], &[]).unwrap();
        assert_eq!(
            xml,
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="layer1"/></svg>"#
        );
    }

    #[test]
    fn test_undeclared_namespace_gets_conventional_prefix() {
        let mut tree = svg_tree();
        let frame = tree.create_element(QName::sozi("frame"));
        let root = tree.root();
        tree.append_child(root, frame);
        tree.set_attribute(frame, &QName::sozi("title"), "Intro");

        let xml = write(&tree, &[], &[]).unwrap();
        assert_eq!(
            xml,
            format!(
                r#"<svg xmlns="{SVG_NS}" xmlns:sozi="{SOZI_NS}"><sozi:frame sozi:title="Intro"/></svg>"#
            )
        );
    }

    #[test]
    fn test_default_bound_namespace_needs_prefix_on_attributes() {
        let mut tree = XmlTree::new(QName::sozi("frame"));
        tree.declare_namespace("", SOZI_NS);
        let root = tree.root();
        tree.set_attribute(root, &QName::sozi("title"), "A");

        let xml = write(&tree, &[], &[]).unwrap();
        assert_eq!(
            xml,
            format!(r#"<frame xmlns="{SOZI_NS}" xmlns:sozi="{SOZI_NS}" sozi:title="A"/>"#)
        );
    }

    #[test]
    fn test_unknown_namespace_gets_generated_prefix() {
        let mut tree = svg_tree();
        let root = tree.root();
        tree.set_attribute(root, &QName::new("urn:example", "flag"), "1");

        let xml = write(&tree, &[], &[]).unwrap();
        assert!(xml.contains(r#"xmlns:ns="urn:example""#));
        assert!(xml.contains(r#"ns:flag="1""#));
    }

    #[test]
    fn test_unqualified_element_undeclares_default_namespace() {
        let mut tree = svg_tree();
        let root = tree.root();
        let data = tree.create_element(QName::unqualified("data"));
        tree.append_child(root, data);
        let rect = tree.create_element(QName::svg("rect"));
        tree.append_child(data, rect);

        let xml = write(&tree, &[], &[]).unwrap();
        assert_eq!(
            xml,
            format!(r#"<svg xmlns="{SVG_NS}"><data xmlns=""><rect xmlns="{SVG_NS}"/></data></svg>"#)
        );
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let mut tree = svg_tree();
        let root = tree.root();
        tree.set_attribute(root, &QName::unqualified("title"), "a < b & c");

        let xml = write(&tree, &[], &[]).unwrap();
        assert!(xml.contains(r#"title="a &lt; b &amp; c""#));
    }
}
