//! Error types for chain parsing, graph construction and rendering

use std::fmt;
use std::path::PathBuf;

/// Why a path string could not be tokenized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPathReason {
    /// Empty or whitespace-only path
    Empty,
    /// An empty hop between two delimiters (or before/after one)
    EmptySegment {
        /// Zero-based segment position
        position: usize,
    },
    /// `A → A` under a policy that forbids self-loops
    SelfLoop,
}

impl fmt::Display for InvalidPathReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "path is empty"),
            Self::EmptySegment { position } => write!(f, "empty process at hop {position}"),
            Self::SelfLoop => write!(f, "process spawns itself and self-loops are rejected"),
        }
    }
}

/// Errors raised while turning a path string into a rendered image
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// Path string failed tokenization or graph policy
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path string
        path: String,
        /// What was wrong with it
        reason: InvalidPathReason,
    },

    /// Layout or render requested for a graph without nodes
    #[error("graph has no nodes to lay out")]
    EmptyGraph,

    /// Canvas size outside what the renderer can allocate
    #[error("canvas {width}x{height} cannot be allocated")]
    CanvasSize {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },

    /// Layout produced a coordinate that cannot be drawn
    #[error("layout produced a non-finite position for {0:?}")]
    DegenerateLayout(String),

    /// PNG encoding failed
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// Writing the image artifact failed
    #[error("io error writing {path}: {source}")]
    Io {
        /// Destination file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ChainError {
    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>, reason: InvalidPathReason) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason,
        }
    }

    /// True when the failure comes from the path string itself rather than
    /// from layout or drawing
    #[inline]
    #[must_use]
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, Self::InvalidPath { .. })
    }
}
