//! Process chain graphs
//!
//! Turns a textual process chain into a directed graph and draws it:
//!
//! ```text
//! "explorer.exe → cmd.exe" → PathTokenizer → ChainGraphBuilder → ChainGraph
//!                                                                   ↓
//!                                    PNG ← GraphRenderer ← SpringLayout (seeded)
//! ```
//!
//! # Example
//!
//! ```rust
//! use procpath_chain::prelude::*;
//!
//! let tokenizer = PathTokenizer::default();
//! let graph = ChainGraph::from_path("A → B → C", &tokenizer, SelfLoopPolicy::Allow)?;
//! assert_eq!(graph.node_count(), 3);
//! assert_eq!(graph.edge_count(), 2);
//!
//! let rendered = GraphRenderer::new(RenderStyle::default()).render(&graph)?;
//! assert!(!rendered.png_bytes().is_empty());
//! # Ok::<(), procpath_chain::ChainError>(())
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
mod font;
pub mod graph;
pub mod layout;
pub mod render;
pub mod tokenizer;

pub use error::{ChainError, InvalidPathReason};
pub use graph::{ChainGraph, ChainGraphBuilder, ProcessEdge, ProcessNode, SelfLoopPolicy};
pub use layout::{
    Layout, SpringLayout, DEFAULT_LAYOUT_ITERATIONS, DEFAULT_LAYOUT_SEED, MAX_LAYOUT_ITERATIONS,
};
pub use render::{
    GraphRenderer, RenderStyle, RenderedGraph, MAX_CANVAS_SIDE, MAX_LABEL_SCALE, MAX_NODE_RADIUS,
};
pub use tokenizer::{PathTokenizer, TokenizedPath, Tokens, PATH_DELIMITER};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building and drawing chain graphs
    pub use crate::error::ChainError;
    pub use crate::graph::{ChainGraph, ChainGraphBuilder, SelfLoopPolicy};
    pub use crate::layout::SpringLayout;
    pub use crate::render::{GraphRenderer, RenderStyle};
    pub use crate::tokenizer::PathTokenizer;
}
