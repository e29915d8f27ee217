mod editor_state;
pub mod persistence;

pub use editor_state::{Editor, EventResponse};
pub use persistence::{
    DesignFile,
    PersistenceError,
    PersistenceResult,
};
