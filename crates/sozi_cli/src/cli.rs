// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line arguments.

use clap::{Args as CommandArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Edit the frames of a Sozi presentation stored in an SVG document
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// SVG document holding the presentation
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Write the edited document here instead of overwriting FILE
    #[arg(short = 'o', long = "output", value_name = "OUT")]
    pub output: Option<PathBuf>,

    /// Model settings (RON)
    #[arg(short = 's', long = "settings", value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Increase logging verbosity (default: info, -v: debug, -vv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Presentation edits and queries.
///
/// Positions are 1-based, like sequence numbers.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List frames in presentation order
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the labels of the drawing's layers
    Labels,

    /// Append a new frame
    Add(NewFrame),

    /// Insert a new frame at a position
    Insert {
        /// Position of the new frame (up to the frame count + 1)
        #[arg(value_name = "POS")]
        position: usize,

        #[command(flatten)]
        frame: NewFrame,
    },

    /// Delete a frame
    Delete {
        /// Position of the frame
        #[arg(value_name = "POS")]
        position: usize,
    },

    /// Exchange two frames
    Swap {
        /// Position of the first frame
        #[arg(value_name = "A")]
        first: usize,

        /// Position of the second frame
        #[arg(value_name = "B")]
        second: usize,
    },

    /// Change frame properties
    Set {
        /// Position of the frame
        #[arg(value_name = "POS")]
        position: usize,

        #[command(flatten)]
        changes: FrameChanges,
    },

    /// Add a layer to a frame
    AddLayer {
        /// Position of the frame
        #[arg(value_name = "POS")]
        position: usize,

        /// Id of the drawing group the layer controls
        #[arg(value_name = "GROUP")]
        group: String,

        /// Id of the element defining the layer's view
        #[arg(value_name = "REFID")]
        refid: String,
    },

    /// Delete a layer from a frame
    DeleteLayer {
        /// Position of the frame
        #[arg(value_name = "POS")]
        position: usize,

        /// Position of the layer within the frame
        #[arg(value_name = "LAYER_POS")]
        layer: usize,
    },
}

/// Initial values of a new frame
#[derive(CommandArgs, Debug, Clone, Default, PartialEq)]
pub struct NewFrame {
    /// Frame title
    #[arg(long)]
    pub title: Option<String>,

    /// Id of the element whose bounding box defines the view
    #[arg(long)]
    pub refid: Option<String>,
}

/// Frame properties to overwrite; absent options are left unchanged
#[derive(CommandArgs, Debug, Clone, Default, PartialEq)]
pub struct FrameChanges {
    /// Frame title
    #[arg(long)]
    pub title: Option<String>,

    /// Hide content outside the view
    #[arg(long, value_name = "BOOL")]
    pub hide: Option<bool>,

    /// Clip to the view boundary
    #[arg(long, value_name = "BOOL")]
    pub clip: Option<bool>,

    /// Advance automatically after the timeout
    #[arg(long, value_name = "BOOL")]
    pub timeout_enable: Option<bool>,

    /// Timeout before advancing, in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u32>,

    /// Transition duration, in milliseconds
    #[arg(long, value_name = "MS")]
    pub transition_duration_ms: Option<u32>,

    /// Transition zoom, in percent (may be negative)
    #[arg(long, value_name = "PERCENT", allow_hyphen_values = true)]
    pub transition_zoom_percent: Option<i32>,

    /// Transition timing profile
    #[arg(long, value_name = "PROFILE")]
    pub transition_profile: Option<String>,
}

impl FrameChanges {
    /// Whether no property is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_command() {
        let args = Args::try_parse_from([
            "sozi-frames",
            "slides.svg",
            "-o",
            "out.svg",
            "set",
            "2",
            "--title",
            "Intro",
            "--hide",
            "false",
            "--transition-zoom-percent",
            "-20",
        ])
        .unwrap();

        assert_eq!(args.file, PathBuf::from("slides.svg"));
        assert_eq!(args.output, Some(PathBuf::from("out.svg")));
        let Command::Set { position, changes } = args.command else {
            panic!("expected set command");
        };
        assert_eq!(position, 2);
        assert_eq!(changes.title.as_deref(), Some("Intro"));
        assert_eq!(changes.hide, Some(false));
        assert_eq!(changes.transition_zoom_percent, Some(-20));
        assert_eq!(changes.clip, None);
    }

    #[test]
    fn test_parse_layer_commands() {
        let args =
            Args::try_parse_from(["sozi-frames", "-vv", "a.svg", "add-layer", "1", "g1", "r1"])
                .unwrap();
        assert_eq!(args.verbosity, 2);
        assert_eq!(
            args.command,
            Command::AddLayer {
                position: 1,
                group: "g1".to_string(),
                refid: "r1".to_string(),
            }
        );

        let args = Args::try_parse_from(["sozi-frames", "a.svg", "delete-layer", "1", "2"]).unwrap();
        assert_eq!(args.command, Command::DeleteLayer { position: 1, layer: 2 });
    }

    #[test]
    fn test_missing_command_is_rejected() {
        assert!(Args::try_parse_from(["sozi-frames", "a.svg"]).is_err());
    }
}
