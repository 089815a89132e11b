// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed attribute codec.
//!
//! Every persisted field is declared once as a [`Field<T>`]: its qualified
//! name plus a value type implementing [`AttrValue`]. Reading and writing go
//! through the same declaration, so both directions always agree on the
//! attribute name and its text encoding.

use crate::error::{DocumentError, Result};
use crate::tree::{AttributedTree, NodeId, QName, SOZI_NS};
use std::marker::PhantomData;

/// A value that can be stored as attribute text
pub trait AttrValue: Sized + Clone + PartialEq {
    /// Parse the attribute text
    fn decode(raw: &str) -> std::result::Result<Self, String>;

    /// Serialize to attribute text
    fn encode(&self) -> String;
}

impl AttrValue for String {
    fn decode(raw: &str) -> std::result::Result<Self, String> {
        Ok(raw.to_string())
    }

    fn encode(&self) -> String {
        self.clone()
    }
}

/// Only the literal `true` is true; any other token reads as false.
impl AttrValue for bool {
    fn decode(raw: &str) -> std::result::Result<Self, String> {
        Ok(raw == "true")
    }

    fn encode(&self) -> String {
        let token = if *self { "true" } else { "false" };
        token.to_string()
    }
}

macro_rules! decimal_attr_value {
    ($($ty:ty),*) => {
        $(
            impl AttrValue for $ty {
                fn decode(raw: &str) -> std::result::Result<Self, String> {
                    raw.trim().parse::<$ty>().map_err(|e| e.to_string())
                }

                fn encode(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

decimal_attr_value!(i32, i64, u32);

/// Read and decode an attribute; `Ok(None)` when absent
pub fn read_attr<T: AttrValue>(
    tree: &impl AttributedTree,
    node: NodeId,
    name: &QName,
) -> Result<Option<T>> {
    let Some(raw) = tree.attribute(node, name) else {
        return Ok(None);
    };
    T::decode(raw)
        .map(Some)
        .map_err(|reason| DocumentError::AttributeFormat {
            attribute: name.to_string(),
            value: raw.to_string(),
            reason,
        })
}

/// Set an attribute from text, or remove it when `value` is `None`
pub fn write_attr(tree: &mut impl AttributedTree, node: NodeId, name: &QName, value: Option<&str>) {
    match value {
        Some(value) => tree.set_attribute(node, name, value),
        None => {
            tree.remove_attribute(node, name);
        }
    }
}

/// Declaration of a persisted attribute
#[derive(Debug)]
pub struct Field<T> {
    /// Local name
    pub name: &'static str,
    /// Namespace URI, `None` for host-native attributes such as `id`
    pub namespace: Option<&'static str>,
    value: PhantomData<fn() -> T>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T: AttrValue> Field<T> {
    /// Field in the Sozi namespace
    pub const fn sozi(name: &'static str) -> Self {
        Self {
            name,
            namespace: Some(SOZI_NS),
            value: PhantomData,
        }
    }

    /// Field without namespace
    pub const fn plain(name: &'static str) -> Self {
        Self {
            name,
            namespace: None,
            value: PhantomData,
        }
    }

    /// Qualified attribute name
    pub fn qname(&self) -> QName {
        QName {
            namespace: self.namespace.map(str::to_string),
            local: self.name.to_string(),
        }
    }

    /// Read the value if present
    pub fn read(&self, tree: &impl AttributedTree, node: NodeId) -> Result<Option<T>> {
        read_attr(tree, node, &self.qname())
    }

    /// Read the value, falling back to `default` when absent
    pub fn read_or(&self, tree: &impl AttributedTree, node: NodeId, default: T) -> Result<T> {
        Ok(self.read(tree, node)?.unwrap_or(default))
    }

    /// Read a value that must be present
    pub fn read_required(
        &self,
        tree: &impl AttributedTree,
        node: NodeId,
        element: &'static str,
    ) -> Result<T> {
        self.read(tree, node)?
            .ok_or_else(|| DocumentError::MissingRequiredAttribute {
                element,
                attribute: self.qname().to_string(),
            })
    }

    /// Write the value, or remove the attribute for `None`
    pub fn write(&self, tree: &mut impl AttributedTree, node: NodeId, value: Option<&T>) {
        let encoded = value.map(AttrValue::encode);
        write_attr(tree, node, &self.qname(), encoded.as_deref());
    }

    /// Write the value unless it equals `fallback` and omission is requested,
    /// in which case the attribute is removed so readers fall back as well
    pub fn write_unless_default(
        &self,
        tree: &mut impl AttributedTree,
        node: NodeId,
        value: &T,
        fallback: &T,
        omit_defaults: bool,
    ) {
        if omit_defaults && value == fallback {
            self.write(tree, node, None);
        } else {
            self.write(tree, node, Some(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::XmlTree;

    const HIDE: Field<bool> = Field::sozi("hide");
    const TIMEOUT: Field<u32> = Field::sozi("timeout-ms");
    const TITLE: Field<String> = Field::sozi("title");
    const ID: Field<String> = Field::plain("id");

    fn tree_with_node() -> (XmlTree, NodeId) {
        let mut tree = XmlTree::new(QName::svg("svg"));
        let node = tree.create_element(QName::sozi("frame"));
        let root = tree.root();
        tree.append_child(root, node);
        (tree, node)
    }

    #[test]
    fn test_default_returned_unconverted_when_absent() {
        let (tree, node) = tree_with_node();
        assert!(HIDE.read_or(&tree, node, true).unwrap());
        assert_eq!(TIMEOUT.read_or(&tree, node, 5000).unwrap(), 5000);
        assert_eq!(TITLE.read(&tree, node).unwrap(), None);
    }

    #[test]
    fn test_boolean_encoding() {
        let (mut tree, node) = tree_with_node();
        HIDE.write(&mut tree, node, Some(&false));
        assert_eq!(tree.attribute(node, &HIDE.qname()), Some("false"));
        assert!(!HIDE.read_or(&tree, node, true).unwrap());

        tree.set_attribute(node, &HIDE.qname(), "yes");
        assert!(!HIDE.read_or(&tree, node, true).unwrap());
    }

    #[test]
    fn test_integer_parsing() {
        let (mut tree, node) = tree_with_node();
        tree.set_attribute(node, &TIMEOUT.qname(), " 250 ");
        assert_eq!(TIMEOUT.read(&tree, node).unwrap(), Some(250));

        tree.set_attribute(node, &TIMEOUT.qname(), "fast");
        let err = TIMEOUT.read(&tree, node).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::AttributeFormat { ref attribute, ref value, .. }
                if attribute == "sozi:timeout-ms" && value == "fast"
        ));
    }

    #[test]
    fn test_write_none_removes_attribute() {
        let (mut tree, node) = tree_with_node();
        TITLE.write(&mut tree, node, Some(&"Intro".to_string()));
        assert_eq!(tree.attribute(node, &TITLE.qname()), Some("Intro"));

        TITLE.write(&mut tree, node, None);
        assert_eq!(tree.attribute(node, &TITLE.qname()), None);

        // Removing an absent attribute is fine
        TITLE.write(&mut tree, node, None);
    }

    #[test]
    fn test_plain_field_has_no_namespace() {
        let (mut tree, node) = tree_with_node();
        ID.write(&mut tree, node, Some(&"frame1".to_string()));
        assert_eq!(tree.attribute(node, &QName::unqualified("id")), Some("frame1"));
    }

    #[test]
    fn test_required_field_missing() {
        let (tree, node) = tree_with_node();
        let err = TITLE.read_required(&tree, node, "layer").unwrap_err();
        assert!(matches!(err, DocumentError::MissingRequiredAttribute { element: "layer", .. }));
    }

    #[test]
    fn test_write_unless_default() {
        let (mut tree, node) = tree_with_node();
        HIDE.write_unless_default(&mut tree, node, &true, &true, false);
        assert_eq!(tree.attribute(node, &HIDE.qname()), Some("true"));

        HIDE.write_unless_default(&mut tree, node, &true, &true, true);
        assert_eq!(tree.attribute(node, &HIDE.qname()), None);

        HIDE.write_unless_default(&mut tree, node, &false, &true, true);
        assert_eq!(tree.attribute(node, &HIDE.qname()), Some("false"));
    }
}
