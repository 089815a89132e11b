// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error type for SVG loading and saving.

use thiserror::Error;

/// Errors raised while parsing or serializing an SVG document
#[derive(Debug, Error)]
pub enum SvgError {
    /// XML syntax error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute
    #[error("Attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// Non UTF-8 name or content
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A prefix is used without a matching `xmlns:` declaration
    #[error("Unbound namespace prefix: {0}")]
    UnboundPrefix(String),

    /// The input has no root element
    #[error("Document has no root element")]
    MissingRoot,

    /// An element appears after the root element was closed
    #[error("Unexpected element <{0}> after the root element")]
    TrailingElement(String),

    /// An end tag does not match the open element
    #[error("Unexpected end tag </{0}>")]
    UnexpectedEnd(String),

    /// The input ends inside an element
    #[error("Unclosed element <{0}>")]
    Unclosed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for SVG operations
pub type Result<T> = std::result::Result<T, SvgError>;
