//! WebAssembly execution stack
//!
//! Holds the operand values, a storage-width tag for every operand, and the
//! frame stack. It is driven by an interpreter loop running bytecode that
//! has already been validated, so most operations take their preconditions
//! on trust. A broken precondition is a bug in the caller: the fast paths
//! panic instead of returning an error, and the `try_` variants report the
//! same conditions as [`StackError`] for callers that want to check.
//!
//! Offsets come in two flavours:
//! - peek offsets are 1-based distances from the top (`1` is the top value)
//! - erase bounds are 0-based distances from the top, half open:
//!   `erase_range(from_top, to_top)` removes the values with peek offsets
//!   `to_top + 1 ..= from_top`

use super::config::StackConfig;
use super::cursor::InstrCursor;
use super::frame::Frame;
use super::value::{TypeTag, Value};
use super::StackError;
use log::trace;
use std::fmt;
use std::ops::Range;

/// Operand values, their width tags, and call/label frames of one execution
///
/// `values` and `types` always have the same length and are index-aligned.
pub struct ExecutionStack<'m, M, C> {
    pub(crate) values: Vec<Value>,
    pub(crate) types: Vec<TypeTag>,
    pub(crate) frames: Vec<Frame<'m, M, C>>,
}

#[cold]
#[inline(never)]
fn contract_violation(err: StackError) -> ! {
    panic!("execution stack contract violated: {}", err)
}

/// Range of operand slots to erase when tearing down `frame` while keeping
/// the `keep` topmost values
fn erasable_region<M, C>(
    frame: &Frame<'_, M, C>,
    index: usize,
    size: usize,
    keep: usize,
) -> Result<Range<usize>, StackError> {
    if frame.value_pos < frame.locals {
        return Err(StackError::LocalsExceedBase {
            index,
            locals: frame.locals,
            value_pos: frame.value_pos,
        });
    }
    let base = frame.value_pos - frame.locals;
    match size.checked_sub(keep) {
        Some(end) if end >= base => Ok(base..end),
        _ => Err(StackError::NegativeRegion { base, keep, size }),
    }
}

impl<'m, M, C> Default for ExecutionStack<'m, M, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'m, M, C> ExecutionStack<'m, M, C> {
    /// Create an empty stack with the default reservations
    pub fn new() -> Self {
        Self::with_config(&StackConfig::default())
    }

    pub fn with_config(config: &StackConfig) -> Self {
        ExecutionStack {
            values: Vec::with_capacity(config.value_capacity),
            types: Vec::with_capacity(config.value_capacity),
            frames: Vec::with_capacity(config.frame_capacity),
        }
    }

    /// Number of operand values on the stack
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn types(&self) -> &[TypeTag] {
        &self.types
    }

    pub fn frames(&self) -> &[Frame<'m, M, C>] {
        &self.frames
    }

    /// The innermost frame, if any
    pub fn current_frame(&self) -> Option<&Frame<'m, M, C>> {
        self.frames.last()
    }

    /// Push a value, tagging it with its storage width
    pub fn push(&mut self, value: Value) {
        self.types.push(TypeTag::of(&value));
        self.values.push(value);
    }

    /// Push a value with a caller-supplied tag
    ///
    /// For callers that know the target type statically, e.g. when
    /// materialising a typed null reference.
    pub fn push_tagged(&mut self, value: Value, tag: TypeTag) {
        self.types.push(tag);
        self.values.push(value);
    }

    /// Pop the top value
    ///
    /// # Panics
    /// If the stack is empty.
    pub fn pop(&mut self) -> Value {
        self.try_pop().unwrap_or_else(|err| contract_violation(err))
    }

    pub fn try_pop(&mut self) -> Result<Value, StackError> {
        let value = self.values.pop().ok_or(StackError::StackUnderflow)?;
        self.types.pop();
        Ok(value)
    }

    /// The top value
    ///
    /// # Panics
    /// If the stack is empty.
    pub fn peek_top(&mut self) -> &mut Value {
        self.peek_top_n(1)
    }

    /// The value `offset` slots from the top; `offset == 1` is the top
    ///
    /// # Panics
    /// Unless `1 <= offset <= len()`.
    pub fn peek_top_n(&mut self, offset: usize) -> &mut Value {
        match self.top_index(offset) {
            Ok(index) => &mut self.values[index],
            Err(err) => contract_violation(err),
        }
    }

    pub fn try_peek_top_n(&mut self, offset: usize) -> Result<&mut Value, StackError> {
        let index = self.top_index(offset)?;
        Ok(&mut self.values[index])
    }

    /// Width tag of the top value
    ///
    /// # Panics
    /// If the stack is empty.
    pub fn peek_type_top(&mut self) -> &mut TypeTag {
        self.peek_type_top_n(1)
    }

    /// Width tag of the value `offset` slots from the top
    ///
    /// # Panics
    /// Unless `1 <= offset <= len()`.
    pub fn peek_type_top_n(&mut self, offset: usize) -> &mut TypeTag {
        match self.top_index(offset) {
            Ok(index) => &mut self.types[index],
            Err(err) => contract_violation(err),
        }
    }

    fn top_index(&self, offset: usize) -> Result<usize, StackError> {
        let size = self.values.len();
        if offset == 0 || offset > size {
            return Err(StackError::PeekOutOfRange { offset, size });
        }
        Ok(size - offset)
    }

    /// The `n` topmost values, bottom to top
    ///
    /// # Panics
    /// If fewer than `n` values are on the stack.
    pub fn top_slice(&self, n: usize) -> &[Value] {
        let start = self.slice_start(n);
        &self.values[start..]
    }

    pub fn top_slice_mut(&mut self, n: usize) -> &mut [Value] {
        let start = self.slice_start(n);
        &mut self.values[start..]
    }

    fn slice_start(&self, n: usize) -> usize {
        let size = self.values.len();
        match size.checked_sub(n) {
            Some(start) => start,
            None => contract_violation(StackError::PeekOutOfRange { offset: n, size }),
        }
    }

    /// Remove the values between two 0-based distances from the top
    ///
    /// The `to_top` topmost values survive and slide down over the erased
    /// ones.
    ///
    /// # Panics
    /// Unless `to_top <= from_top <= len()`.
    pub fn erase_range(&mut self, from_top: usize, to_top: usize) {
        let size = self.values.len();
        if to_top > from_top || from_top > size {
            contract_violation(StackError::EraseOutOfRange { from_top, to_top, size });
        }
        self.erase(size - from_top..size - to_top);
    }

    fn erase(&mut self, region: Range<usize>) {
        if region.is_empty() {
            return;
        }
        self.values.drain(region.clone());
        self.types.drain(region);
    }

    /// Module instance of the innermost frame
    ///
    /// # Panics
    /// If no frame is active.
    pub fn current_module(&self) -> &'m M {
        match self.frames.last() {
            Some(frame) => frame.module,
            None => contract_violation(StackError::NoActiveFrame),
        }
    }

    /// Clear values, tags and frames for a fresh execution
    pub fn reset(&mut self) {
        trace!(
            "reset: dropping {} values and {} frames",
            self.values.len(),
            self.frames.len()
        );
        self.values.clear();
        self.types.clear();
        self.frames.clear();
    }

    /// Check every structural invariant of the stack
    ///
    /// This walks all frames, so it is meant for tests, restores and
    /// instrumented runs rather than the dispatch loop.
    pub fn verify(&self) -> Result<(), StackError> {
        let size = self.values.len();
        if self.types.len() != size {
            return Err(StackError::MisalignedTags {
                values: size,
                types: self.types.len(),
            });
        }
        let mut floor = 0;
        for (index, frame) in self.frames.iter().enumerate() {
            floor = check_frame(frame, index, size, floor)?;
        }
        Ok(())
    }

    /// Cheap form of [`verify`](Self::verify) covering only the top frame
    fn debug_verify_top(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        let size = self.values.len();
        if self.types.len() != size {
            contract_violation(StackError::MisalignedTags {
                values: size,
                types: self.types.len(),
            });
        }
        let n = self.frames.len();
        if n == 0 {
            return;
        }
        let floor = if n > 1 { self.frames[n - 2].base() } else { 0 };
        if let Err(err) = check_frame(&self.frames[n - 1], n - 1, size, floor) {
            contract_violation(err);
        }
    }
}

/// Validate one frame against the stack height and the base of the frame
/// below it, returning this frame's base
fn check_frame<M, C>(frame: &Frame<'_, M, C>, index: usize, size: usize, floor: usize) -> Result<usize, StackError> {
    if frame.value_pos < frame.locals {
        return Err(StackError::LocalsExceedBase {
            index,
            locals: frame.locals,
            value_pos: frame.value_pos,
        });
    }
    let base = frame.value_pos - frame.locals;
    if base > size {
        return Err(StackError::FrameAboveStack { index, base, size });
    }
    if base < floor {
        return Err(StackError::FramesOutOfOrder { index });
    }
    Ok(base)
}

impl<'m, M, C: InstrCursor> ExecutionStack<'m, M, C> {
    /// Enter a function or label frame
    ///
    /// The `locals` values directly below the current top become the
    /// frame's locals; the current height is recorded as its `value_pos`.
    pub fn push_frame(&mut self, module: &'m M, resume: C, locals: usize, arity: usize) {
        let value_pos = self.values.len();
        trace!("enter frame {}: locals={locals} arity={arity} value_pos={value_pos}", self.frames.len());
        self.frames.push(Frame::new(module, resume, locals, arity, value_pos));
        self.debug_verify_top();
    }

    /// Reuse the innermost frame for a tail call
    ///
    /// The outgoing frame's locals and operands are erased except for the
    /// `locals` topmost values (the callee's arguments, order preserved).
    /// The frame then takes the callee's module, locals and arity; its
    /// resume cursor is kept so the callee returns to the original caller.
    /// Every precondition is checked before anything is mutated.
    ///
    /// # Panics
    /// If no frame is active or the region to erase would have negative
    /// length.
    pub fn push_tail_frame(&mut self, module: &'m M, locals: usize, arity: usize) {
        self.try_push_tail_frame(module, locals, arity)
            .unwrap_or_else(|err| contract_violation(err))
    }

    /// Checked form of [`push_tail_frame`](Self::push_tail_frame); on error
    /// values, tags and frames are left untouched
    pub fn try_push_tail_frame(&mut self, module: &'m M, locals: usize, arity: usize) -> Result<(), StackError> {
        let index = self.frames.len().checked_sub(1).ok_or(StackError::NoActiveFrame)?;
        let region = erasable_region(&self.frames[index], index, self.values.len(), locals)?;
        trace!(
            "tail call in frame {index}: erasing {} values, locals={locals} arity={arity}",
            region.len()
        );

        self.erase(region);
        let value_pos = self.values.len();
        if let Some(frame) = self.frames.last_mut() {
            frame.module = module;
            frame.locals = locals;
            frame.arity = arity;
            frame.value_pos = value_pos;
        }
        self.debug_verify_top();
        Ok(())
    }

    /// Tear down the innermost frame and return its resume cursor
    ///
    /// Everything from the frame's first local up to its `arity` results is
    /// erased; the results slide down to the frame's base.
    ///
    /// # Panics
    /// If no frame is active or fewer than `arity` values lie above the
    /// frame's base.
    pub fn pop_frame(&mut self) -> C {
        self.try_pop_frame().unwrap_or_else(|err| contract_violation(err))
    }

    pub fn try_pop_frame(&mut self) -> Result<C, StackError> {
        let index = self.frames.len().checked_sub(1).ok_or(StackError::NoActiveFrame)?;
        let frame = &self.frames[index];
        let region = erasable_region(frame, index, self.values.len(), frame.arity)?;
        let resume = frame.resume;
        trace!(
            "leave frame {index}: erasing {} values, keeping {}",
            region.len(),
            frame.arity
        );

        self.erase(region);
        self.frames.pop();
        self.debug_verify_top();
        Ok(resume)
    }

    /// Leave the innermost label if `cursor` sits on the end of its region
    ///
    /// Returns the frame's resume cursor when a frame was torn down and
    /// `cursor` otherwise. The base frame is never torn down here.
    pub fn leave_label_if_last(&mut self, cursor: C) -> C {
        if self.frames.len() > 1 && cursor.is_last() {
            self.pop_frame()
        } else {
            cursor
        }
    }
}

impl<'m, M, C: fmt::Debug> fmt::Debug for ExecutionStack<'m, M, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionStack")
            .field("values", &self.values)
            .field("types", &self.types)
            .field("frames", &self.frames)
            .finish()
    }
}
