// SPDX-License-Identifier: MIT OR Apache-2.0
//! Presentation document.
//!
//! The document owns the ordered frame list and keeps every frame's sequence
//! number equal to its one-based position. Structural edits happen in
//! memory; [`Document::write`] commits them to the tree in a single pass.

use crate::error::{DocumentError, Result};
use crate::frame::{frame_element, Frame, FrameId};
use crate::lifecycle::TrackedList;
use crate::settings::ModelSettings;
use crate::tree::{AttributedTree, QName};

/// The frame sequence of a presentation
#[derive(Debug)]
pub struct Document {
    frames: TrackedList<Frame>,
    layer_labels: Vec<String>,
    settings: ModelSettings,
}

impl Document {
    /// Build the model from a tree using default settings
    pub fn load(tree: &mut impl AttributedTree) -> Result<Self> {
        Self::load_with_settings(tree, ModelSettings::default())
    }

    /// Build the model from a tree.
    ///
    /// Frames are ordered by their persisted sequence number. Frames whose
    /// number is missing or not positive come last, in document order. The
    /// sequence numbers are then rewritten to be dense from 1.
    pub fn load_with_settings(
        tree: &mut impl AttributedTree,
        settings: ModelSettings,
    ) -> Result<Self> {
        let layer_labels = collect_layer_labels(&*tree);

        let nodes = tree.descendants_named(&frame_element());
        let mut loaded = Vec::with_capacity(nodes.len());
        for node in nodes {
            loaded.push(Frame::load(tree, node, 0, &settings.frame_defaults)?);
        }

        // Stable: ties keep document order
        loaded.sort_by_key(|frame| match frame.sequence() {
            seq if seq > 0 => (false, seq),
            _ => (true, 0),
        });

        let mut frames = TrackedList::new();
        for frame in loaded {
            frames.push(frame);
        }

        let mut document = Self {
            frames,
            layer_labels,
            settings,
        };
        document.renumber_from(0);

        tracing::info!(
            "Loaded {} frame(s), {} drawing layer(s)",
            document.len(),
            document.layer_labels.len()
        );
        Ok(document)
    }

    /// Settings in effect
    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Labels of the drawing's layer groups, in document order
    pub fn layer_labels(&self) -> &[String] {
        &self.layer_labels
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the document has no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in presentation order
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    /// Frame at the given index
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Mutable frame at the given index
    pub fn frame_mut(&mut self, index: usize) -> Option<&mut Frame> {
        self.frames.get_mut(index)
    }

    /// Index of the frame with the given element id
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.frames.iter().position(|frame| frame.id() == id)
    }

    /// Number of deleted frames whose elements are removed on the next write
    pub fn pending_removals(&self) -> usize {
        self.frames.pending_count()
    }

    /// Create a detached frame numbered after the current last frame
    pub fn new_frame(&self, tree: &mut impl AttributedTree) -> Frame {
        let sequence = self.len() as i64 + 1;
        Frame::create(tree, sequence, &self.settings.frame_defaults)
    }

    /// Append a frame. Sequence numbers are left untouched.
    pub fn add_frame(&mut self, frame: Frame) {
        tracing::debug!("Adding frame {} at the end", frame.id());
        self.frames.push(frame);
    }

    /// Insert a frame at `index` (`index == len` appends) and renumber from there
    pub fn insert_frame(&mut self, index: usize, frame: Frame) -> Result<()> {
        tracing::debug!("Inserting frame {} at index {}", frame.id(), index);
        self.frames.insert(index, frame)?;
        self.renumber_from(index);
        Ok(())
    }

    /// Exchange two frames and their sequence numbers
    pub fn swap_frames(&mut self, first: usize, second: usize) -> Result<()> {
        let len = self.len();
        for index in [first, second] {
            if index >= len {
                return Err(DocumentError::IndexOutOfRange { index, len });
            }
        }

        if let Some(frame) = self.frames.get_mut(first) {
            frame.set_sequence(second as i64 + 1);
        }
        if let Some(frame) = self.frames.get_mut(second) {
            frame.set_sequence(first as i64 + 1);
        }
        self.frames.swap(first, second)?;

        tracing::debug!("Swapped frames {} and {}", first, second);
        Ok(())
    }

    /// Remove the frame at `index` and renumber the frames after it.
    ///
    /// The removed frame keeps its sequence number; its element leaves the
    /// tree on the next [`write`](Self::write).
    pub fn delete_frame(&mut self, index: usize) -> Result<&Frame> {
        let len = self.len();
        let key: FrameId = self.frames.remove(index)?.key();
        self.renumber_from(index);

        let frame = self
            .frames
            .get_by_key(key)
            .ok_or(DocumentError::IndexOutOfRange { index, len })?;
        tracing::debug!("Deleted frame {} (was at index {})", frame.id(), index);
        Ok(frame)
    }

    /// Set `frames[p].sequence = p + 1` for every `p >= index`
    pub fn renumber_from(&mut self, index: usize) {
        for (position, frame) in self.frames.iter_mut().enumerate().skip(index) {
            frame.set_sequence(position as i64 + 1);
        }
    }

    /// Commit every frame, including deleted ones, to the tree
    pub fn write(&mut self, tree: &mut impl AttributedTree) {
        let defaults = &self.settings.frame_defaults;
        let policy = self.settings.write_policy;

        for frame in self.frames.all_mut() {
            frame.write(tree, defaults, policy);
        }
        let removed = self.frames.purge();

        tracing::info!("Wrote {} frame(s), removed {}", self.frames.len(), removed);
    }
}

/// Labels of the root's `svg:g` children in Inkscape layer mode
fn collect_layer_labels(tree: &impl AttributedTree) -> Vec<String> {
    let group_mode = QName::inkscape("groupmode");
    let label = QName::inkscape("label");

    tree.children_named(tree.root(), &QName::svg("g"))
        .into_iter()
        .filter(|&group| tree.attribute(group, &group_mode) == Some("layer"))
        .filter_map(|group| tree.attribute(group, &label).map(str::to_string))
        .collect()
}
