// SPDX-License-Identifier: MIT OR Apache-2.0
//! SVG file adapter for the Sozi presentation model.
//!
//! Parses an SVG document into an [`XmlTree`] that [`sozi_document::Document`]
//! reads from and writes to, then serializes it back. Content the model never
//! touches (text, comments, the XML declaration, attribute order) survives a
//! load/save cycle.

pub mod error;
mod reader;
mod writer;

pub use error::{Result, SvgError};

use quick_xml::events::Event;
use sozi_document::XmlTree;
use std::path::Path;

/// An SVG document held in memory
#[derive(Debug, Clone)]
pub struct SvgDocument {
    tree: XmlTree,
    prolog: Vec<Event<'static>>,
    epilog: Vec<Event<'static>>,
}

impl SvgDocument {
    /// Parse SVG markup
    pub fn parse(input: &str) -> Result<Self> {
        let parsed = reader::parse(input)?;
        tracing::debug!(
            "Parsed SVG: {} namespace declarations",
            parsed.tree.namespaces().len()
        );
        Ok(Self {
            tree: parsed.tree,
            prolog: parsed.prolog,
            epilog: parsed.epilog,
        })
    }

    /// Load an SVG file
    pub fn open(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let document = Self::parse(&content)?;
        tracing::info!("Opened SVG from {:?}", path);
        Ok(document)
    }

    /// Wrap an existing tree, without XML declaration
    pub fn from_tree(tree: XmlTree) -> Self {
        Self {
            tree,
            prolog: Vec::new(),
            epilog: Vec::new(),
        }
    }

    /// Element tree
    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    /// Element tree, mutably
    pub fn tree_mut(&mut self) -> &mut XmlTree {
        &mut self.tree
    }

    /// Take the element tree
    pub fn into_tree(self) -> XmlTree {
        self.tree
    }

    /// Serialize to XML text
    pub fn to_xml_string(&self) -> Result<String> {
        writer::write(&self.tree, &self.prolog, &self.epilog)
    }

    /// Write to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_xml_string()?;
        std::fs::write(path, content)?;
        tracing::info!("Saved SVG to {:?}", path);
        Ok(())
    }
}
