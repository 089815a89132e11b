// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host tree abstraction.
//!
//! The presentation model never owns the markup tree. It reads and writes
//! namespace-qualified attributes through [`AttributedTree`]. Node handles
//! are issued by the implementing tree, such as the arena in [`crate::memory`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace of the Sozi presentation attributes
pub const SOZI_NS: &str = "http://sozi.baierouge.fr";
/// Inkscape extension namespace (labels, layer group mode)
pub const INKSCAPE_NS: &str = "http://www.inkscape.org/namespaces/inkscape";
/// SVG namespace
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
/// Reserved `xml:` namespace
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Conventional prefix for a well-known namespace URI
pub fn conventional_prefix(namespace: &str) -> Option<&'static str> {
    match namespace {
        SOZI_NS => Some("sozi"),
        INKSCAPE_NS => Some("inkscape"),
        SVG_NS => Some("svg"),
        XML_NS => Some("xml"),
        _ => None,
    }
}

/// Handle to a node of the host tree.
///
/// Handles are only issued by the tree and are valid for the tree that
/// issued them; they cannot be built from a raw index:
///
/// ```compile_fail
/// let node = sozi_document::NodeId(0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Namespace-qualified name of an element or attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    /// Namespace URI, `None` for unqualified names
    pub namespace: Option<String>,
    /// Local part of the name
    pub local: String,
}

impl QName {
    /// Create a name in the given namespace
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// Create a name without namespace
    pub fn unqualified(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// Create a name in the Sozi namespace
    pub fn sozi(local: impl Into<String>) -> Self {
        Self::new(SOZI_NS, local)
    }

    /// Create a name in the Inkscape namespace
    pub fn inkscape(local: impl Into<String>) -> Self {
        Self::new(INKSCAPE_NS, local)
    }

    /// Create a name in the SVG namespace
    pub fn svg(local: impl Into<String>) -> Self {
        Self::new(SVG_NS, local)
    }

    /// Check the namespace and local part at once
    pub fn is(&self, namespace: Option<&str>, local: &str) -> bool {
        self.namespace.as_deref() == namespace && self.local == local
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace.as_deref() {
            None => write!(f, "{}", self.local),
            Some(ns) => match conventional_prefix(ns) {
                Some(prefix) => write!(f, "{prefix}:{}", self.local),
                None => write!(f, "{{{ns}}}{}", self.local),
            },
        }
    }
}

/// An externally owned tree of elements carrying namespace-qualified attributes.
///
/// "Attached" nodes are the root and its descendants. Queries only ever see
/// attached nodes; [`create_element`](Self::create_element) produces a
/// detached node that becomes visible once appended.
pub trait AttributedTree {
    /// Root element of the document
    fn root(&self) -> NodeId;

    /// Parent element, `None` for the root and for detached nodes
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Attribute value, if present
    fn attribute(&self, node: NodeId, name: &QName) -> Option<&str>;

    /// Set (overwrite) an attribute value
    fn set_attribute(&mut self, node: NodeId, name: &QName, value: &str);

    /// Remove an attribute, returning its previous value
    fn remove_attribute(&mut self, node: NodeId, name: &QName) -> Option<String>;

    /// All attached elements with the given name, in document order
    fn descendants_named(&self, name: &QName) -> Vec<NodeId>;

    /// Direct child elements of `parent` with the given name, in document order
    fn children_named(&self, parent: NodeId, name: &QName) -> Vec<NodeId>;

    /// First attached element whose unqualified `id` attribute equals `id`
    fn find_by_id(&self, id: &str) -> Option<NodeId>;

    /// Create a new detached element
    fn create_element(&mut self, name: QName) -> NodeId;

    /// Append `child` as the last child of `parent`, moving it if already placed
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Detach a node from its parent (no-op for detached nodes)
    fn detach(&mut self, node: NodeId);

    /// Return an identifier not used by any element nor handed out before.
    ///
    /// The hint itself is returned when it is free.
    fn unique_id(&mut self, hint: &str) -> String;
}
