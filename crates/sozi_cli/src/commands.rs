// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command execution against a loaded presentation.

use crate::cli::{Args, Command, FrameChanges, NewFrame};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use sozi_document::{Document, Frame, ModelSettings, XmlTree};
use sozi_svg::SvgDocument;
use std::io::Write;

/// Load the document, run the command and save when it changed something
pub fn run(args: &Args) -> Result<()> {
    let settings = match &args.settings {
        Some(path) => ModelSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => ModelSettings::default(),
    };

    let mut svg = SvgDocument::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let mut document = Document::load_with_settings(svg.tree_mut(), settings)
        .with_context(|| format!("Invalid presentation in {}", args.file.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let modified = apply(&args.command, &mut document, svg.tree_mut(), &mut out)?;

    if modified {
        document.write(svg.tree_mut());
        let target = args.output.as_deref().unwrap_or(&args.file);
        svg.save(target)
            .with_context(|| format!("Failed to save {}", target.display()))?;
        tracing::info!("Wrote {} frame(s) to {}", document.len(), target.display());
    }
    Ok(())
}

/// Apply a command to the model. Returns whether the model was modified.
pub fn apply(
    command: &Command,
    document: &mut Document,
    tree: &mut XmlTree,
    out: &mut impl Write,
) -> Result<bool> {
    match command {
        Command::List { json } => {
            list(document, *json, out)?;
            Ok(false)
        }
        Command::Labels => {
            for label in document.layer_labels() {
                writeln!(out, "{label}")?;
            }
            Ok(false)
        }
        Command::Add(spec) => {
            let frame = new_frame(document, tree, spec);
            document.add_frame(frame);
            Ok(true)
        }
        Command::Insert { position, frame } => {
            let index = insertion_index(*position, document.len())?;
            let frame = new_frame(document, tree, frame);
            document.insert_frame(index, frame)?;
            Ok(true)
        }
        Command::Delete { position } => {
            let index = frame_index(*position, document.len())?;
            let frame = document.delete_frame(index)?;
            tracing::info!("Deleted frame {}", frame.id());
            Ok(true)
        }
        Command::Swap { first, second } => {
            let len = document.len();
            document.swap_frames(frame_index(*first, len)?, frame_index(*second, len)?)?;
            Ok(true)
        }
        Command::Set { position, changes } => {
            if changes.is_empty() {
                bail!("Nothing to change; pass at least one property option");
            }
            let index = frame_index(*position, document.len())?;
            let frame = document
                .frame_mut(index)
                .with_context(|| format!("No frame at position {position}"))?;
            apply_changes(frame, changes);
            Ok(true)
        }
        Command::AddLayer {
            position,
            group,
            refid,
        } => {
            let index = frame_index(*position, document.len())?;
            let frame = document
                .frame_mut(index)
                .with_context(|| format!("No frame at position {position}"))?;
            let layer = frame.new_layer(tree, group.as_str(), refid.as_str());
            frame.add_layer(layer);
            Ok(true)
        }
        Command::DeleteLayer { position, layer } => {
            let index = frame_index(*position, document.len())?;
            let frame = document
                .frame_mut(index)
                .with_context(|| format!("No frame at position {position}"))?;
            let layer_index = frame_index(*layer, frame.layer_count())
                .context("Invalid layer position")?;
            frame.delete_layer(layer_index)?;
            Ok(true)
        }
    }
}

fn new_frame(document: &Document, tree: &mut XmlTree, spec: &NewFrame) -> Frame {
    let mut frame = document.new_frame(tree);
    if let Some(title) = &spec.title {
        frame.title = title.clone();
    }
    if let Some(refid) = &spec.refid {
        frame.refid = Some(refid.clone());
    }
    frame
}

fn apply_changes(frame: &mut Frame, changes: &FrameChanges) {
    if let Some(title) = &changes.title {
        frame.title = title.clone();
    }
    if let Some(hide) = changes.hide {
        frame.hide = hide;
    }
    if let Some(clip) = changes.clip {
        frame.clip = clip;
    }
    if let Some(enable) = changes.timeout_enable {
        frame.timeout_enable = enable;
    }
    if let Some(ms) = changes.timeout_ms {
        frame.timeout_ms = ms;
    }
    if let Some(ms) = changes.transition_duration_ms {
        frame.transition_duration_ms = ms;
    }
    if let Some(percent) = changes.transition_zoom_percent {
        frame.transition_zoom_percent = percent;
    }
    if let Some(profile) = &changes.transition_profile {
        frame.transition_profile = profile.clone();
    }
}

/// Convert a 1-based position of an existing entry to an index
fn frame_index(position: usize, len: usize) -> Result<usize> {
    if position == 0 || position > len {
        bail!("Position {position} is out of range (1..={len})");
    }
    Ok(position - 1)
}

/// Convert a 1-based insertion position to an index; `len + 1` appends
fn insertion_index(position: usize, len: usize) -> Result<usize> {
    if position == 0 || position > len + 1 {
        bail!("Position {position} is out of range (1..={})", len + 1);
    }
    Ok(position - 1)
}

#[derive(Debug, Serialize)]
struct FrameSummary {
    sequence: i64,
    id: String,
    title: String,
    refid: Option<String>,
    layers: Vec<LayerSummary>,
}

#[derive(Debug, Serialize)]
struct LayerSummary {
    group: String,
    label: String,
    refid: String,
}

impl From<&Frame> for FrameSummary {
    fn from(frame: &Frame) -> Self {
        Self {
            sequence: frame.sequence(),
            id: frame.id().to_string(),
            title: frame.title.clone(),
            refid: frame.refid.clone(),
            layers: frame
                .layers()
                .map(|layer| LayerSummary {
                    group: layer.group.clone(),
                    label: layer.label().to_string(),
                    refid: layer.refid.clone(),
                })
                .collect(),
        }
    }
}

fn list(document: &Document, json: bool, out: &mut impl Write) -> Result<()> {
    if json {
        let summaries: Vec<FrameSummary> = document.frames().map(FrameSummary::from).collect();
        let text = serde_json::to_string_pretty(&summaries)?;
        writeln!(out, "{text}")?;
        return Ok(());
    }

    for frame in document.frames() {
        writeln!(
            out,
            "{:>3}  {:<16} {:<24} {} layer(s)",
            frame.sequence(),
            frame.id(),
            frame.title,
            frame.layer_count()
        )?;
    }
    Ok(())
}
