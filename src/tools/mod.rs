//! Canvas interaction tools.
//!
//! The selection tool is the only one: it owns the selection and turns
//! pointer presses, moves and releases into selection changes, drags,
//! resizes and rotations on the document.

mod selection_tool;

pub use selection_tool::{
    ContextAction, PointerDownOutcome, ResizeOrigin, SelectionState, SelectionTool, SelectionToolConfig,
    resize_bounds,
};
