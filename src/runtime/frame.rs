//! Activation records
//!
//! A frame is pushed for every function call and every label region. It
//! owns no values itself: its locals and operands live on the shared operand
//! stack, and the frame only records where its region starts.

use std::fmt;

/// One activation record on the frame stack
///
/// `module` is a plain borrow. The owning module instance must outlive the
/// execution stack that refers to it, which the `'m` lifetime enforces.
pub struct Frame<'m, M, C> {
    /// Module instance the running code belongs to
    pub module: &'m M,
    /// Where execution continues once this frame is torn down
    pub resume: C,
    /// Operand slots below `value_pos` holding this frame's locals
    pub locals: usize,
    /// Number of results kept when the frame is torn down
    pub arity: usize,
    /// Operand stack height when the frame was entered
    pub value_pos: usize,
}

impl<'m, M, C> Frame<'m, M, C> {
    pub fn new(module: &'m M, resume: C, locals: usize, arity: usize, value_pos: usize) -> Self {
        Frame {
            module,
            resume,
            locals,
            arity,
            value_pos,
        }
    }

    /// Lowest operand slot owned by this frame (its first local)
    ///
    /// Saturates if `locals > value_pos`, which no well-formed frame has.
    pub fn base(&self) -> usize {
        self.value_pos.saturating_sub(self.locals)
    }
}

impl<'m, M, C: Clone> Clone for Frame<'m, M, C> {
    fn clone(&self) -> Self {
        Frame {
            module: self.module,
            resume: self.resume.clone(),
            locals: self.locals,
            arity: self.arity,
            value_pos: self.value_pos,
        }
    }
}

impl<'m, M, C: Copy> Copy for Frame<'m, M, C> {}

impl<'m, M, C: PartialEq> PartialEq for Frame<'m, M, C> {
    /// Module references compare by identity
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.module, other.module)
            && self.resume == other.resume
            && self.locals == other.locals
            && self.arity == other.arity
            && self.value_pos == other.value_pos
    }
}

impl<'m, M, C: fmt::Debug> fmt::Debug for Frame<'m, M, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("module", &(self.module as *const M))
            .field("resume", &self.resume)
            .field("locals", &self.locals)
            .field("arity", &self.arity)
            .field("value_pos", &self.value_pos)
            .finish()
    }
}
