//! Whole-state checkpoint and restore
//!
//! These are escape hatches for suspending an execution and picking it up
//! later, possibly in another process. They are deliberately separate from
//! the per-instruction operations on [`ExecutionStack`]: a snapshot is
//! taken or restored as a unit, and a restore is checked before it is
//! committed.
//!
//! Frames borrow their module instance, so they cannot be serialized as-is.
//! [`SnapshotImage`] swaps each module reference for a caller-assigned id
//! and each resume cursor for its position plus the id of the module whose
//! code it points into. That is usually the caller's module, not the
//! frame's own, and after a tail call across modules it is neither
//! neighbour's. The caller maps ids and positions back when loading the
//! image.

use super::cursor::InstrCursor;
use super::frame::Frame;
use super::stack::ExecutionStack;
use super::value::{TypeTag, Value};
use super::StackError;
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem;

/// Copy of all three sequences of an execution stack
pub struct StackSnapshot<'m, M, C> {
    pub values: Vec<Value>,
    pub types: Vec<TypeTag>,
    pub frames: Vec<Frame<'m, M, C>>,
}

impl<'m, M, C: Clone> Clone for StackSnapshot<'m, M, C> {
    fn clone(&self) -> Self {
        StackSnapshot {
            values: self.values.clone(),
            types: self.types.clone(),
            frames: self.frames.clone(),
        }
    }
}

impl<'m, M, C: PartialEq> PartialEq for StackSnapshot<'m, M, C> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.types == other.types && self.frames == other.frames
    }
}

impl<'m, M, C: fmt::Debug> fmt::Debug for StackSnapshot<'m, M, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackSnapshot")
            .field("values", &self.values)
            .field("types", &self.types)
            .field("frames", &self.frames)
            .finish()
    }
}

/// Serializable form of a [`Frame`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameImage {
    pub module: u32,
    /// Module owning the code `resume` points into
    pub resume_module: u32,
    pub resume: usize,
    pub locals: usize,
    pub arity: usize,
    pub value_pos: usize,
}

/// Serializable form of a [`StackSnapshot`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotImage {
    pub values: Vec<Value>,
    pub types: Vec<TypeTag>,
    pub frames: Vec<FrameImage>,
}

impl SnapshotImage {
    pub fn to_json(&self) -> Result<String, StackError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StackError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<'m, M, C: InstrCursor> StackSnapshot<'m, M, C> {
    /// Convert to a serializable image
    ///
    /// `module_id` names module instances; `cursor_module` names the module
    /// whose code a resume cursor points into, using the same ids.
    pub fn to_image(
        &self,
        mut module_id: impl FnMut(&M) -> u32,
        mut cursor_module: impl FnMut(&C) -> u32,
    ) -> SnapshotImage {
        let frames = self
            .frames
            .iter()
            .map(|frame| FrameImage {
                module: module_id(frame.module),
                resume_module: cursor_module(&frame.resume),
                resume: frame.resume.position(),
                locals: frame.locals,
                arity: frame.arity,
                value_pos: frame.value_pos,
            })
            .collect();
        SnapshotImage {
            values: self.values.clone(),
            types: self.types.clone(),
            frames,
        }
    }

    /// Rebuild a snapshot from an image
    ///
    /// `module` resolves module ids; `resume` turns a position inside a
    /// module back into a cursor. It is handed the module named by
    /// `resume_module`, not the frame's own.
    pub fn from_image(
        image: SnapshotImage,
        mut module: impl FnMut(u32) -> Option<&'m M>,
        mut resume: impl FnMut(&'m M, usize) -> Option<C>,
    ) -> Result<Self, StackError> {
        let mut frames = Vec::with_capacity(image.frames.len());
        for frame in image.frames {
            let instance = module(frame.module).ok_or(StackError::UnknownModule(frame.module))?;
            let owner = module(frame.resume_module).ok_or(StackError::UnknownModule(frame.resume_module))?;
            let cursor = resume(owner, frame.resume).ok_or(StackError::InvalidResume {
                module: frame.resume_module,
                position: frame.resume,
            })?;
            frames.push(Frame::new(instance, cursor, frame.locals, frame.arity, frame.value_pos));
        }
        Ok(StackSnapshot {
            values: image.values,
            types: image.types,
            frames,
        })
    }
}

impl<'m, M, C: Clone> ExecutionStack<'m, M, C> {
    /// Copy the whole stack state
    pub fn snapshot(&self) -> StackSnapshot<'m, M, C> {
        StackSnapshot {
            values: self.values.clone(),
            types: self.types.clone(),
            frames: self.frames.clone(),
        }
    }

    pub fn export_values(&self) -> Vec<Value> {
        self.values.clone()
    }

    pub fn export_types(&self) -> Vec<TypeTag> {
        self.types.clone()
    }

    pub fn export_frames(&self) -> Vec<Frame<'m, M, C>> {
        self.frames.clone()
    }
}

impl<'m, M, C> ExecutionStack<'m, M, C> {
    /// Move the whole stack state out, leaving the stack empty
    pub fn take_snapshot(&mut self) -> StackSnapshot<'m, M, C> {
        trace!(
            "take snapshot: {} values, {} frames",
            self.values.len(),
            self.frames.len()
        );
        StackSnapshot {
            values: mem::take(&mut self.values),
            types: mem::take(&mut self.types),
            frames: mem::take(&mut self.frames),
        }
    }

    /// Replace the whole stack state with `snapshot`
    ///
    /// The snapshot must satisfy every invariant [`verify`](Self::verify)
    /// checks. On error the stack is left untouched.
    pub fn restore(&mut self, snapshot: StackSnapshot<'m, M, C>) -> Result<(), StackError> {
        let restored = Self::from_snapshot(snapshot)?;
        trace!(
            "restore snapshot: {} values, {} frames",
            restored.values.len(),
            restored.frames.len()
        );
        *self = restored;
        Ok(())
    }

    /// Build a stack from a snapshot, checking its invariants
    pub fn from_snapshot(snapshot: StackSnapshot<'m, M, C>) -> Result<Self, StackError> {
        let stack = ExecutionStack {
            values: snapshot.values,
            types: snapshot.types,
            frames: snapshot.frames,
        };
        stack.verify()?;
        Ok(stack)
    }
}
