// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error type for the presentation model.

use thiserror::Error;

/// Errors raised while building, mutating or configuring a document model
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A mandatory attribute is absent from an element
    #[error("Missing required attribute {attribute} on <{element}>")]
    MissingRequiredAttribute {
        /// Element kind ("frame" or "layer")
        element: &'static str,
        /// Qualified attribute name
        attribute: String,
    },

    /// An attribute value could not be converted to its typed form
    #[error("Invalid value {value:?} for attribute {attribute}: {reason}")]
    AttributeFormat {
        /// Qualified attribute name
        attribute: String,
        /// Raw attribute text
        value: String,
        /// Conversion failure
        reason: String,
    },

    /// A frame or layer index does not exist
    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Collection length at the time of the request
        len: usize,
    },

    /// Settings could not be parsed or serialized
    #[error("Settings error: {0}")]
    Settings(String),

    /// Settings were written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedSettingsVersion {
        /// Version found in the file
        found: u32,
        /// Highest version this build understands
        supported: u32,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for document operations
pub type Result<T> = std::result::Result<T, DocumentError>;
