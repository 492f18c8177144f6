//! WebAssembly execution stack
//!
//! This module provides the runtime state an interpreter loop computes
//! over: operand values with their storage-width tags, call and label
//! frames, and whole-state snapshots for checkpointing.

pub mod config;
pub mod cursor;
pub mod frame;
pub mod snapshot;
pub mod stack;
pub mod test_utils;
pub mod value;

pub use config::StackConfig;
pub use cursor::{Cursor, InstrCursor, RegionEnd};
pub use frame::Frame;
pub use snapshot::{FrameImage, SnapshotImage, StackSnapshot};
pub use stack::ExecutionStack;
pub use value::{TypeTag, Value, ValueType};

#[derive(Debug, thiserror::Error)]
pub enum StackError {
    #[error("Stack underflow")]
    StackUnderflow,
    #[error("Peek offset {offset} out of range for stack of {size} values")]
    PeekOutOfRange { offset: usize, size: usize },
    #[error("No active frame")]
    NoActiveFrame,
    #[error("Frame region starting at {base} cannot keep {keep} of {size} values")]
    NegativeRegion { base: usize, keep: usize, size: usize },
    #[error("Erase range {from_top}..{to_top} from top out of range for stack of {size} values")]
    EraseOutOfRange { from_top: usize, to_top: usize, size: usize },
    #[error("Type tags out of step with values: {values} values, {types} tags")]
    MisalignedTags { values: usize, types: usize },
    #[error("Frame {index} claims {locals} locals below value position {value_pos}")]
    LocalsExceedBase {
        index: usize,
        locals: usize,
        value_pos: usize,
    },
    #[error("Frame {index} starts at {base}, above the stack height {size}")]
    FrameAboveStack { index: usize, base: usize, size: usize },
    #[error("Frame {index} starts below the frame under it")]
    FramesOutOfOrder { index: usize },
    #[error("Unknown module: {0}")]
    UnknownModule(u32),
    #[error("Invalid resume position {position} in module {module}")]
    InvalidResume { module: u32, position: usize },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
