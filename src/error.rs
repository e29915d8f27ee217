use std::path::PathBuf;

use thiserror::Error;

use crate::assistant::AssistantError;
use crate::command::{CommandError, HistoryError};
use crate::raster::RasterError;
use crate::state::PersistenceError;

/// Everything that can go wrong behind an [`Editor`](crate::state::Editor) call.
///
/// None of these leave the document half-changed.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Assistant(#[from] AssistantError),

    #[error("the design has no shape to export")]
    NoShape,

    #[error("failed to export {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type EditorResult<T> = Result<T, EditorError>;
