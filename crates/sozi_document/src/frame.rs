// SPDX-License-Identifier: MIT OR Apache-2.0
//! Presentation frames.
//!
//! A frame is one step of the presentation: a view onto the drawing plus
//! timing and transition settings. It owns the layers that refine how
//! individual groups are shown during that step.

use crate::attr::Field;
use crate::error::Result;
use crate::layer::{layer_element, Layer, LayerDefaults};
use crate::lifecycle::{Lifecycle, Tracked, TrackedList, WriteAction};
use crate::settings::{FrameDefaults, WritePolicy};
use crate::tree::{AttributedTree, NodeId, QName};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ID: Field<String> = Field::plain("id");
const REFID: Field<String> = Field::sozi("refid");
const TITLE: Field<String> = Field::sozi("title");
const SEQUENCE: Field<i64> = Field::sozi("sequence");
const HIDE: Field<bool> = Field::sozi("hide");
const CLIP: Field<bool> = Field::sozi("clip");
const TIMEOUT_ENABLE: Field<bool> = Field::sozi("timeout-enable");
const TIMEOUT_MS: Field<u32> = Field::sozi("timeout-ms");
const TRANSITION_DURATION_MS: Field<u32> = Field::sozi("transition-duration-ms");
const TRANSITION_ZOOM_PERCENT: Field<i32> = Field::sozi("transition-zoom-percent");
const TRANSITION_PROFILE: Field<String> = Field::sozi("transition-profile");

/// Name of the frame marker element
pub fn frame_element() -> QName {
    QName::sozi("frame")
}

/// Unique in-memory identifier for a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameId(pub Uuid);

impl FrameId {
    /// Create a new random frame ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FrameId {
    fn default() -> Self {
        Self::new()
    }
}

/// A presentation frame
#[derive(Debug)]
pub struct Frame {
    key: FrameId,
    node: NodeId,
    lifecycle: Lifecycle,
    id: String,
    sequence: i64,
    /// Id of the element whose bounding box defines the view
    pub refid: Option<String>,
    /// Frame title
    pub title: String,
    /// Hide content outside the view
    pub hide: bool,
    /// Clip to the view boundary
    pub clip: bool,
    /// Advance automatically after `timeout_ms`
    pub timeout_enable: bool,
    /// Timeout before advancing, in milliseconds
    pub timeout_ms: u32,
    /// Duration of the transition into this frame, in milliseconds
    pub transition_duration_ms: u32,
    /// Zoom applied during the transition, in percent
    pub transition_zoom_percent: i32,
    /// Transition timing profile
    pub transition_profile: String,
    layers: TrackedList<Layer>,
}

impl Frame {
    /// Read a frame and its layers from an existing element.
    ///
    /// `default_sequence` is used when the element has no sequence number.
    pub(crate) fn load(
        tree: &mut impl AttributedTree,
        node: NodeId,
        default_sequence: i64,
        defaults: &FrameDefaults,
    ) -> Result<Self> {
        let view = &*tree;
        let sequence = SEQUENCE.read_or(view, node, default_sequence)?;
        let mut frame = Self {
            key: FrameId::new(),
            node,
            lifecycle: Lifecycle::existing(),
            id: String::new(),
            sequence,
            refid: REFID.read(view, node)?,
            title: TITLE.read_or(view, node, defaults.title.clone())?,
            hide: HIDE.read_or(view, node, defaults.hide)?,
            clip: CLIP.read_or(view, node, defaults.clip)?,
            timeout_enable: TIMEOUT_ENABLE.read_or(view, node, defaults.timeout_enable)?,
            timeout_ms: TIMEOUT_MS.read_or(view, node, defaults.timeout_ms)?,
            transition_duration_ms: TRANSITION_DURATION_MS.read_or(
                view,
                node,
                defaults.transition_duration_ms,
            )?,
            transition_zoom_percent: TRANSITION_ZOOM_PERCENT.read_or(
                view,
                node,
                defaults.transition_zoom_percent,
            )?,
            transition_profile: TRANSITION_PROFILE.read_or(
                view,
                node,
                defaults.transition_profile.clone(),
            )?,
            layers: TrackedList::new(),
        };

        frame.id = match ID.read(&*tree, node)? {
            Some(id) => id,
            None => tree.unique_id(&format!("frame{sequence}")),
        };

        let inherited = frame.layer_defaults();
        for layer_node in tree.children_named(node, &layer_element()) {
            frame.layers.push(Layer::load(&*tree, layer_node, &inherited)?);
        }

        Ok(frame)
    }

    /// Create a frame backed by a new, not yet inserted element
    pub(crate) fn create(
        tree: &mut impl AttributedTree,
        sequence: i64,
        defaults: &FrameDefaults,
    ) -> Self {
        let node = tree.create_element(frame_element());
        let id = tree.unique_id(&format!("frame{sequence}"));

        Self {
            key: FrameId::new(),
            node,
            lifecycle: Lifecycle::created(),
            id,
            sequence,
            refid: None,
            title: defaults.title.clone(),
            hide: defaults.hide,
            clip: defaults.clip,
            timeout_enable: defaults.timeout_enable,
            timeout_ms: defaults.timeout_ms,
            transition_duration_ms: defaults.transition_duration_ms,
            transition_zoom_percent: defaults.transition_zoom_percent,
            transition_profile: defaults.transition_profile.clone(),
            layers: TrackedList::new(),
        }
    }

    /// In-memory identifier
    pub fn key(&self) -> FrameId {
        self.key
    }

    /// Persisted element id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// One-based position in the presentation
    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    pub(crate) fn set_sequence(&mut self, sequence: i64) {
        self.sequence = sequence;
    }

    /// Backing element
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Values inherited by layers built from now on
    pub fn layer_defaults(&self) -> LayerDefaults {
        LayerDefaults {
            hide: self.hide,
            clip: self.clip,
            transition_zoom_percent: self.transition_zoom_percent,
            transition_profile: self.transition_profile.clone(),
        }
    }

    /// Create a detached layer inheriting this frame's current values
    pub fn new_layer(
        &self,
        tree: &mut impl AttributedTree,
        group: impl Into<String>,
        refid: impl Into<String>,
    ) -> Layer {
        Layer::create(tree, group.into(), refid.into(), &self.layer_defaults())
    }

    /// Append a layer
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Insert a layer at the given index
    pub fn insert_layer(&mut self, index: usize, layer: Layer) -> Result<()> {
        self.layers.insert(index, layer)
    }

    /// Remove the layer at the given index; its element is removed on write
    pub fn delete_layer(&mut self, index: usize) -> Result<&Layer> {
        let layer = self.layers.remove(index)?;
        tracing::debug!("Deleted layer {} from frame {}", layer.group, self.id);
        Ok(&*layer)
    }

    /// Layers in order
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Layer at the given index
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Mutable layer at the given index
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    /// Number of layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Commit the frame, then its layers, to the tree
    pub(crate) fn write(
        &mut self,
        tree: &mut impl AttributedTree,
        defaults: &FrameDefaults,
        policy: WritePolicy,
    ) {
        match self.lifecycle.write_action() {
            WriteAction::Skip => return,
            WriteAction::Remove => {
                tree.detach(self.node);
                tracing::debug!("Removed frame element {}", self.id);
            }
            WriteAction::Append => {
                let root = tree.root();
                tree.append_child(root, self.node);
                tracing::debug!("Appended frame element {}", self.id);
                self.write_fields(tree, defaults, policy);
                self.write_layers(tree, policy);
            }
            WriteAction::Update => {
                self.write_fields(tree, defaults, policy);
                self.write_layers(tree, policy);
            }
        }
        self.lifecycle.committed();
    }

    fn write_fields(
        &self,
        tree: &mut impl AttributedTree,
        defaults: &FrameDefaults,
        policy: WritePolicy,
    ) {
        let omit = policy.omits_defaults();
        let node = self.node;

        REFID.write(tree, node, self.refid.as_ref());
        TITLE.write_unless_default(tree, node, &self.title, &defaults.title, omit);
        SEQUENCE.write(tree, node, Some(&self.sequence));
        HIDE.write_unless_default(tree, node, &self.hide, &defaults.hide, omit);
        CLIP.write_unless_default(tree, node, &self.clip, &defaults.clip, omit);
        TIMEOUT_ENABLE.write_unless_default(
            tree,
            node,
            &self.timeout_enable,
            &defaults.timeout_enable,
            omit,
        );
        TIMEOUT_MS.write_unless_default(tree, node, &self.timeout_ms, &defaults.timeout_ms, omit);
        TRANSITION_DURATION_MS.write_unless_default(
            tree,
            node,
            &self.transition_duration_ms,
            &defaults.transition_duration_ms,
            omit,
        );
        TRANSITION_ZOOM_PERCENT.write_unless_default(
            tree,
            node,
            &self.transition_zoom_percent,
            &defaults.transition_zoom_percent,
            omit,
        );
        TRANSITION_PROFILE.write_unless_default(
            tree,
            node,
            &self.transition_profile,
            &defaults.transition_profile,
            omit,
        );
        ID.write(tree, node, Some(&self.id));
    }

    fn write_layers(&mut self, tree: &mut impl AttributedTree, policy: WritePolicy) {
        // Layers compare against the values just written
        let inherited = self.layer_defaults();
        for layer in self.layers.all_mut() {
            layer.write(tree, self.node, &inherited, policy);
        }
        let removed = self.layers.purge();
        if removed > 0 {
            tracing::debug!("Purged {} deleted layer(s) from frame {}", removed, self.id);
        }

        // Layer elements carry no sequence number: element order is layer order
        let expected: Vec<NodeId> = self.layers.iter().map(Layer::node).collect();
        if tree.children_named(self.node, &layer_element()) != expected {
            for node in expected {
                tree.append_child(self.node, node);
            }
            tracing::debug!("Reordered layer elements of frame {}", self.id);
        }
    }
}

impl Tracked for Frame {
    type Key = FrameId;

    fn key(&self) -> FrameId {
        self.key
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocumentError;
    use crate::lifecycle::LifecycleState;
    use crate::memory::XmlTree;

    fn tree_with_frame(attrs: &[(&str, &str)]) -> (XmlTree, NodeId) {
        let mut tree = XmlTree::new(QName::svg("svg"));
        let root = tree.root();
        let node = tree.create_element(frame_element());
        for (name, value) in attrs {
            tree.set_attribute(node, &QName::sozi(*name), value);
        }
        tree.append_child(root, node);
        (tree, node)
    }

    fn add_layer_node(tree: &mut XmlTree, frame: NodeId, group: &str) -> NodeId {
        let node = tree.create_element(layer_element());
        tree.set_attribute(node, &QName::sozi("group"), group);
        tree.set_attribute(node, &QName::sozi("refid"), "view");
        tree.append_child(frame, node);
        node
    }

    #[test]
    fn test_defaults_for_missing_attributes() {
        let (mut tree, node) = tree_with_frame(&[]);
        let frame = Frame::load(&mut tree, node, 0, &FrameDefaults::default()).unwrap();

        assert_eq!(frame.refid, None);
        assert_eq!(frame.title, "");
        assert_eq!(frame.sequence(), 0);
        assert!(frame.hide);
        assert!(frame.clip);
        assert!(!frame.timeout_enable);
        assert_eq!(frame.timeout_ms, 5000);
        assert_eq!(frame.transition_duration_ms, 1000);
        assert_eq!(frame.transition_zoom_percent, 0);
        assert_eq!(frame.transition_profile, "linear");
        assert_eq!(frame.id(), "frame0");
        assert_eq!(frame.lifecycle().state(), LifecycleState::Attached);
    }

    #[test]
    fn test_reads_persisted_values() {
        let (mut tree, node) = tree_with_frame(&[
            ("refid", "rect12"),
            ("title", "Intro"),
            ("sequence", "4"),
            ("hide", "false"),
            ("timeout-enable", "true"),
            ("timeout-ms", "2500"),
            ("transition-profile", "decelerate"),
        ]);
        tree.set_attribute(node, &QName::unqualified("id"), "intro");

        let frame = Frame::load(&mut tree, node, 0, &FrameDefaults::default()).unwrap();
        assert_eq!(frame.refid.as_deref(), Some("rect12"));
        assert_eq!(frame.title, "Intro");
        assert_eq!(frame.sequence(), 4);
        assert!(!frame.hide);
        assert!(frame.timeout_enable);
        assert_eq!(frame.timeout_ms, 2500);
        assert_eq!(frame.transition_profile, "decelerate");
        assert_eq!(frame.id(), "intro");
    }

    #[test]
    fn test_malformed_number_fails() {
        let (mut tree, node) = tree_with_frame(&[("transition-duration-ms", "1s")]);
        let err = Frame::load(&mut tree, node, 0, &FrameDefaults::default()).unwrap_err();
        assert!(matches!(err, DocumentError::AttributeFormat { .. }));
    }

    #[test]
    fn test_layers_loaded_in_order_with_inheritance() {
        let (mut tree, node) = tree_with_frame(&[("hide", "false"), ("transition-zoom-percent", "50")]);
        add_layer_node(&mut tree, node, "a");
        add_layer_node(&mut tree, node, "b");

        let frame = Frame::load(&mut tree, node, 0, &FrameDefaults::default()).unwrap();
        let groups: Vec<_> = frame.layers().map(|l| l.group.as_str()).collect();
        assert_eq!(groups, vec!["a", "b"]);
        assert!(frame.layers().all(|l| !l.hide && l.transition_zoom_percent == 50));
    }

    #[test]
    fn test_layer_inheritance_is_a_snapshot() {
        let (mut tree, node) = tree_with_frame(&[("clip", "false")]);
        add_layer_node(&mut tree, node, "a");

        let mut frame = Frame::load(&mut tree, node, 0, &FrameDefaults::default()).unwrap();
        frame.clip = true;
        assert!(!frame.layer(0).unwrap().clip);

        // A layer built after the change sees the new value
        let layer = frame.new_layer(&mut tree, "b", "view");
        assert!(layer.clip);
    }

    #[test]
    fn test_write_serializes_all_fields() {
        let (mut tree, _) = tree_with_frame(&[]);
        let mut frame = Frame::create(&mut tree, 1, &FrameDefaults::default());
        frame.lifecycle_mut().attach();
        frame.title = "Hello".to_string();
        frame.refid = Some("r1".to_string());
        frame.write(&mut tree, &FrameDefaults::default(), WritePolicy::Always);

        let node = frame.node();
        let get = |local: &str| tree.attribute(node, &QName::sozi(local)).map(str::to_string);
        assert_eq!(get("title").as_deref(), Some("Hello"));
        assert_eq!(get("refid").as_deref(), Some("r1"));
        assert_eq!(get("sequence").as_deref(), Some("1"));
        assert_eq!(get("hide").as_deref(), Some("true"));
        assert_eq!(get("timeout-enable").as_deref(), Some("false"));
        assert_eq!(get("timeout-ms").as_deref(), Some("5000"));
        assert_eq!(get("transition-duration-ms").as_deref(), Some("1000"));
        assert_eq!(get("transition-zoom-percent").as_deref(), Some("0"));
        assert_eq!(get("transition-profile").as_deref(), Some("linear"));
        assert_eq!(tree.attribute(node, &QName::unqualified("id")), Some("frame1"));
        assert_eq!(tree.parent(node), Some(tree.root()));
    }

    #[test]
    fn test_clearing_refid_removes_attribute() {
        let (mut tree, node) = tree_with_frame(&[("refid", "r1")]);
        let mut frame = Frame::load(&mut tree, node, 0, &FrameDefaults::default()).unwrap();
        frame.refid = None;
        frame.write(&mut tree, &FrameDefaults::default(), WritePolicy::Always);
        assert_eq!(tree.attribute(node, &QName::sozi("refid")), None);
    }

    #[test]
    fn test_omit_defaults_policy() {
        let (mut tree, node) = tree_with_frame(&[("timeout-ms", "5000"), ("title", "Kept")]);
        let mut frame = Frame::load(&mut tree, node, 0, &FrameDefaults::default()).unwrap();
        frame.write(&mut tree, &FrameDefaults::default(), WritePolicy::OmitDefaults);

        assert_eq!(tree.attribute(node, &QName::sozi("timeout-ms")), None);
        assert_eq!(tree.attribute(node, &QName::sozi("hide")), None);
        assert_eq!(tree.attribute(node, &QName::sozi("title")), Some("Kept"));
        assert_eq!(tree.attribute(node, &QName::sozi("sequence")), Some("0"));
    }

    #[test]
    fn test_layer_add_delete_and_write() {
        let (mut tree, node) = tree_with_frame(&[]);
        let a = add_layer_node(&mut tree, node, "a");
        let mut frame = Frame::load(&mut tree, node, 1, &FrameDefaults::default()).unwrap();

        let layer = frame.new_layer(&mut tree, "b", "view");
        let b = layer.node();
        frame.add_layer(layer);
        assert_eq!(frame.delete_layer(0).unwrap().group, "a");
        assert_eq!(frame.layer_count(), 1);

        frame.write(&mut tree, &FrameDefaults::default(), WritePolicy::Always);
        assert_eq!(tree.children_named(node, &layer_element()), vec![b]);
        assert_eq!(tree.parent(a), None);
        assert_eq!(tree.attribute(b, &QName::sozi("group")), Some("b"));
    }

    #[test]
    fn test_insert_layer_with_pending_removal() {
        let (mut tree, node) = tree_with_frame(&[]);
        let a = add_layer_node(&mut tree, node, "a");
        let b = add_layer_node(&mut tree, node, "b");
        let c = add_layer_node(&mut tree, node, "c");
        let mut frame = Frame::load(&mut tree, node, 1, &FrameDefaults::default()).unwrap();

        assert_eq!(frame.delete_layer(1).unwrap().group, "b");
        let x = frame.new_layer(&mut tree, "x", "view");
        let y = frame.new_layer(&mut tree, "y", "view");
        let (x_node, y_node) = (x.node(), y.node());
        frame.insert_layer(0, x).unwrap();
        frame.insert_layer(1, y).unwrap();
        frame.layer_mut(1).unwrap().hide = false;

        let groups: Vec<_> = frame.layers().map(|l| l.group.as_str()).collect();
        assert_eq!(groups, vec!["x", "y", "a", "c"]);

        frame.write(&mut tree, &FrameDefaults::default(), WritePolicy::Always);
        assert_eq!(
            tree.children_named(node, &layer_element()),
            vec![x_node, y_node, a, c]
        );
        assert_eq!(tree.parent(b), None);
        assert_eq!(tree.attribute(y_node, &QName::sozi("hide")), Some("false"));

        let reloaded = Frame::load(&mut tree, node, 1, &FrameDefaults::default()).unwrap();
        let groups: Vec<_> = reloaded.layers().map(|l| l.group.as_str()).collect();
        assert_eq!(groups, vec!["x", "y", "a", "c"]);
        assert!(!reloaded.layer(1).unwrap().hide);
    }

    #[test]
    fn test_insert_layer_out_of_range() {
        let (mut tree, node) = tree_with_frame(&[]);
        let mut frame = Frame::load(&mut tree, node, 1, &FrameDefaults::default()).unwrap();
        let layer = frame.new_layer(&mut tree, "b", "view");

        assert!(matches!(
            frame.insert_layer(2, layer),
            Err(DocumentError::IndexOutOfRange { index: 2, len: 0 })
        ));
        assert!(frame.delete_layer(0).is_err());
    }

    #[test]
    fn test_detached_frame_removed_without_serialization() {
        let (mut tree, node) = tree_with_frame(&[("title", "Old")]);
        let mut frame = Frame::load(&mut tree, node, 1, &FrameDefaults::default()).unwrap();
        frame.title = "New".to_string();
        frame.lifecycle_mut().detach();
        frame.write(&mut tree, &FrameDefaults::default(), WritePolicy::Always);

        assert_eq!(tree.parent(node), None);
        assert_eq!(tree.attribute(node, &QName::sozi("title")), Some("Old"));
    }
}
