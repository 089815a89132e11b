// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sozi presentation model.
//!
//! A presentation is an ordered list of frames, each with zero or more
//! layers, persisted as `sozi:` attributes on elements of an SVG document.
//! This crate provides:
//! - A typed attribute codec
//! - A host tree abstraction and an in-memory implementation
//! - Frame/layer lifecycle tracking (new, attached, pending removal)
//! - Frame ordering with dense one-based sequence numbers
//!
//! ## Architecture
//!
//! The model is built from a tree, edited in memory, then committed back:
//! - [`Document::load`] reads and orders every frame
//! - insert/delete/swap keep `sequence == position + 1`
//! - [`Document::write`] appends, updates and removes elements in one pass

pub mod attr;
pub mod document;
pub mod error;
pub mod frame;
pub mod layer;
pub mod lifecycle;
pub mod memory;
pub mod settings;
pub mod tree;

pub use attr::{read_attr, write_attr, AttrValue, Field};
pub use document::Document;
pub use error::{DocumentError, Result};
pub use frame::{frame_element, Frame, FrameId};
pub use layer::{layer_element, Layer, LayerDefaults, LayerId};
pub use lifecycle::{EntryStatus, Lifecycle, LifecycleState, Tracked, TrackedList, WriteAction};
pub use memory::{NamespaceBinding, NodeKind, XmlTree};
pub use settings::{FrameDefaults, ModelSettings, WritePolicy, SETTINGS_FORMAT_VERSION};
pub use tree::{
    conventional_prefix, AttributedTree, NodeId, QName, INKSCAPE_NS, SOZI_NS, SVG_NS, XML_NS,
};
