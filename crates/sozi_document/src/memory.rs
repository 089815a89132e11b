// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory arena tree implementing [`AttributedTree`].
//!
//! Nodes are never freed: detaching a node only unlinks it from its parent,
//! so handles held by the model stay valid for the lifetime of the tree.

use crate::tree::{conventional_prefix, AttributedTree, NodeId, QName, XML_NS};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Content of a tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Element with ordered attributes
    Element {
        /// Element name
        name: QName,
        /// Attributes in insertion order
        attributes: IndexMap<QName, String>,
    },
    /// Character data, kept escaped as found in the source
    Text(String),
    /// CDATA section content
    CData(String),
    /// Comment content
    Comment(String),
    /// Processing instruction content
    ProcessingInstruction(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A namespace prefix declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBinding {
    /// Prefix, empty for the default namespace
    pub prefix: String,
    /// Namespace URI
    pub uri: String,
}

/// Arena-backed element tree
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<NodeData>,
    root: NodeId,
    namespaces: Vec<NamespaceBinding>,
    issued_ids: HashSet<String>,
}

impl XmlTree {
    /// Create a tree holding a single root element
    pub fn new(root_name: QName) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            namespaces: Vec::new(),
            issued_ids: HashSet::new(),
        };
        tree.root = tree.push_node(NodeKind::Element {
            name: root_name,
            attributes: IndexMap::new(),
        });
        tree
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Node content
    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    /// Element name, `None` for non-element nodes
    pub fn name(&self, node: NodeId) -> Option<&QName> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Child nodes in order
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Attributes of an element in order (empty for other nodes)
    pub fn attributes(&self, node: NodeId) -> impl Iterator<Item = (&QName, &str)> {
        let attributes = match &self.nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        };
        attributes
            .into_iter()
            .flat_map(|attrs| attrs.iter().map(|(k, v)| (k, v.as_str())))
    }

    /// Append a non-element node (or an element built elsewhere) to `parent`
    pub fn append_content(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let node = self.push_node(kind);
        self.append_child(parent, node);
        node
    }

    /// Record a namespace declaration and return the prefix actually bound.
    ///
    /// A prefix already bound to another URI is renamed with a numeric suffix.
    /// A second default namespace gets a named prefix instead, since a bare
    /// number is not a valid prefix.
    pub fn declare_namespace(&mut self, prefix: &str, uri: &str) -> String {
        if uri == XML_NS {
            return "xml".to_string();
        }
        if let Some(existing) = self
            .namespaces
            .iter()
            .find(|b| b.prefix == prefix && b.uri == uri)
        {
            return existing.prefix.clone();
        }

        let taken = |candidate: &str| self.namespaces.iter().any(|b| b.prefix == candidate);
        let base = if prefix.is_empty() && taken("") {
            conventional_prefix(uri).unwrap_or("ns")
        } else {
            prefix
        };
        let mut effective = base.to_string();
        let mut counter = 1;
        while taken(&effective) {
            effective = format!("{base}{counter}");
            counter += 1;
        }
        self.namespaces.push(NamespaceBinding {
            prefix: effective.clone(),
            uri: uri.to_string(),
        });
        effective
    }

    /// All recorded namespace declarations, in declaration order
    pub fn namespaces(&self) -> &[NamespaceBinding] {
        &self.namespaces
    }

    /// Whether a node is the root or one of its descendants
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == self.root {
                return true;
            }
            current = self.nodes[n.0].parent;
        }
        false
    }

    /// `node` and all its descendants, in document order
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            result.push(n);
            stack.extend(self.nodes[n.0].children.iter().rev().copied());
        }
        result
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.nodes[n.0].parent;
        }
        false
    }

    fn id_in_use(&self, candidate: &str) -> bool {
        self.issued_ids.contains(candidate) || self.find_by_id(candidate).is_some()
    }
}

impl AttributedTree for XmlTree {
    fn root(&self) -> NodeId {
        self.root
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn attribute(&self, node: NodeId, name: &QName) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            _ => None,
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &QName, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[node.0].kind {
            attributes.insert(name.clone(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &QName) -> Option<String> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => attributes.shift_remove(name),
            _ => None,
        }
    }

    fn descendants_named(&self, name: &QName) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&n| self.name(n) == Some(name))
            .collect()
    }

    fn children_named(&self, parent: NodeId, name: &QName) -> Vec<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .filter(|&n| self.name(n) == Some(name))
            .collect()
    }

    fn find_by_id(&self, id: &str) -> Option<NodeId> {
        let id_attr = QName::unqualified("id");
        self.descendants(self.root)
            .into_iter()
            .find(|&n| self.attribute(n, &id_attr) == Some(id))
    }

    fn create_element(&mut self, name: QName) -> NodeId {
        self.push_node(NodeKind::Element {
            name,
            attributes: IndexMap::new(),
        })
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.is_ancestor_or_self(child, parent) {
            tracing::warn!("Refusing to append {:?} below its own descendant {:?}", child, parent);
            return;
        }
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    fn unique_id(&mut self, hint: &str) -> String {
        let mut candidate = hint.to_string();
        let mut counter = 1;
        while self.id_in_use(&candidate) {
            candidate = format!("{hint}-{counter}");
            counter += 1;
        }
        self.issued_ids.insert(candidate.clone());
        candidate
    }
}
