// SPDX-License-Identifier: MIT OR Apache-2.0
//! Presentation layers.
//!
//! A layer controls how one group of the drawing is shown while its frame is
//! displayed. Display fields missing from the layer element fall back to the
//! enclosing frame's values at the time the layer is constructed.

use crate::attr::Field;
use crate::error::Result;
use crate::lifecycle::{Lifecycle, Tracked, WriteAction};
use crate::settings::WritePolicy;
use crate::tree::{AttributedTree, NodeId, QName};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const GROUP: Field<String> = Field::sozi("group");
const REFID: Field<String> = Field::sozi("refid");
const HIDE: Field<bool> = Field::sozi("hide");
const CLIP: Field<bool> = Field::sozi("clip");
const TRANSITION_ZOOM_PERCENT: Field<i32> = Field::sozi("transition-zoom-percent");
const TRANSITION_PROFILE: Field<String> = Field::sozi("transition-profile");

/// Name of the layer marker element
pub fn layer_element() -> QName {
    QName::sozi("layer")
}

/// Unique in-memory identifier for a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub Uuid);

impl LayerId {
    /// Create a new random layer ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame values a layer inherits when its own attributes are absent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDefaults {
    /// Hide content outside the view
    pub hide: bool,
    /// Clip to the view boundary
    pub clip: bool,
    /// Transition zoom, in percent
    pub transition_zoom_percent: i32,
    /// Transition timing profile
    pub transition_profile: String,
}

/// A layer of a frame
#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    node: NodeId,
    lifecycle: Lifecycle,
    /// Id of the group this layer controls
    pub group: String,
    /// Id of the element providing the layer's view
    pub refid: String,
    /// Hide content outside the view
    pub hide: bool,
    /// Clip to the view boundary
    pub clip: bool,
    /// Transition zoom, in percent
    pub transition_zoom_percent: i32,
    /// Transition timing profile
    pub transition_profile: String,
    label: String,
}

impl Layer {
    /// Read a layer from an existing element
    pub(crate) fn load(
        tree: &impl AttributedTree,
        node: NodeId,
        defaults: &LayerDefaults,
    ) -> Result<Self> {
        let group = GROUP.read_required(tree, node, "layer")?;
        let refid = REFID.read_required(tree, node, "layer")?;
        let label = resolve_label(tree, &group);

        Ok(Self {
            id: LayerId::new(),
            node,
            lifecycle: Lifecycle::existing(),
            hide: HIDE.read_or(tree, node, defaults.hide)?,
            clip: CLIP.read_or(tree, node, defaults.clip)?,
            transition_zoom_percent: TRANSITION_ZOOM_PERCENT.read_or(
                tree,
                node,
                defaults.transition_zoom_percent,
            )?,
            transition_profile: TRANSITION_PROFILE.read_or(
                tree,
                node,
                defaults.transition_profile.clone(),
            )?,
            group,
            refid,
            label,
        })
    }

    /// Create a layer backed by a new, not yet inserted element
    pub(crate) fn create(
        tree: &mut impl AttributedTree,
        group: String,
        refid: String,
        defaults: &LayerDefaults,
    ) -> Self {
        let node = tree.create_element(layer_element());
        let label = resolve_label(tree, &group);

        Self {
            id: LayerId::new(),
            node,
            lifecycle: Lifecycle::created(),
            group,
            refid,
            hide: defaults.hide,
            clip: defaults.clip,
            transition_zoom_percent: defaults.transition_zoom_percent,
            transition_profile: defaults.transition_profile.clone(),
            label,
        }
    }

    /// In-memory identifier
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Backing element
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Display name of the controlled group, as found when the layer was built
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Commit the layer to the tree. `frame_node` receives new layer elements;
    /// `inherited` holds the frame's current values for default omission.
    pub(crate) fn write(
        &mut self,
        tree: &mut impl AttributedTree,
        frame_node: NodeId,
        inherited: &LayerDefaults,
        policy: WritePolicy,
    ) {
        match self.lifecycle.write_action() {
            WriteAction::Skip => return,
            WriteAction::Remove => {
                tree.detach(self.node);
                tracing::debug!("Removed layer element for group {}", self.group);
            }
            WriteAction::Append => {
                tree.append_child(frame_node, self.node);
                tracing::debug!("Appended layer element for group {}", self.group);
                self.write_fields(tree, inherited, policy);
            }
            WriteAction::Update => self.write_fields(tree, inherited, policy),
        }
        self.lifecycle.committed();
    }

    fn write_fields(
        &self,
        tree: &mut impl AttributedTree,
        inherited: &LayerDefaults,
        policy: WritePolicy,
    ) {
        let omit = policy.omits_defaults();
        GROUP.write(tree, self.node, Some(&self.group));
        REFID.write(tree, self.node, Some(&self.refid));
        HIDE.write_unless_default(tree, self.node, &self.hide, &inherited.hide, omit);
        CLIP.write_unless_default(tree, self.node, &self.clip, &inherited.clip, omit);
        TRANSITION_ZOOM_PERCENT.write_unless_default(
            tree,
            self.node,
            &self.transition_zoom_percent,
            &inherited.transition_zoom_percent,
            omit,
        );
        TRANSITION_PROFILE.write_unless_default(
            tree,
            self.node,
            &self.transition_profile,
            &inherited.transition_profile,
            omit,
        );
    }
}

impl Tracked for Layer {
    type Key = LayerId;

    fn key(&self) -> LayerId {
        self.id
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

/// `inkscape:label` of the element with id `group`, or `group` itself
fn resolve_label(tree: &impl AttributedTree, group: &str) -> String {
    tree.find_by_id(group)
        .and_then(|node| tree.attribute(node, &QName::inkscape("label")))
        .unwrap_or(group)
        .to_string()
}
