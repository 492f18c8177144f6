//! Instruction cursors
//!
//! The execution stack never decodes instructions itself. It only needs two
//! things from the interpreter's program counter: whether the instruction
//! under it closes the enclosing label region, and (for migration images)
//! its absolute position in the function body.

/// A copyable program counter as seen by the execution stack
pub trait InstrCursor: Copy {
    /// True if the instruction at this position ends its enclosing label
    fn is_last(&self) -> bool;

    /// Absolute index of this position in its instruction sequence
    fn position(&self) -> usize;
}

/// Implemented by instruction types that can mark the end of a label region
pub trait RegionEnd {
    fn ends_region(&self) -> bool;
}

/// A position in a borrowed instruction sequence
#[derive(Debug)]
pub struct Cursor<'a, I> {
    code: &'a [I],
    pos: usize,
}

impl<'a, I> Clone for Cursor<'a, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, I> Copy for Cursor<'a, I> {}

impl<'a, I> PartialEq for Cursor<'a, I> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.code, other.code) && self.pos == other.pos
    }
}

impl<'a, I> Eq for Cursor<'a, I> {}

impl<'a, I> Cursor<'a, I> {
    /// Cursor at the first instruction of `code`
    pub fn new(code: &'a [I]) -> Self {
        Cursor { code, pos: 0 }
    }

    /// Cursor at `pos`, or `None` if `pos` is past the end of `code`
    pub fn at(code: &'a [I], pos: usize) -> Option<Self> {
        if pos < code.len() {
            Some(Cursor { code, pos })
        } else {
            None
        }
    }

    /// The next position, or `None` at the end of the sequence
    pub fn advance(self) -> Option<Self> {
        Cursor::at(self.code, self.pos + 1)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// The instruction under the cursor
    pub fn instr(&self) -> &'a I {
        &self.code[self.pos]
    }

    pub fn code(&self) -> &'a [I] {
        self.code
    }
}

impl<'a, I: RegionEnd> InstrCursor for Cursor<'a, I> {
    fn is_last(&self) -> bool {
        self.instr().ends_region()
    }

    fn position(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::test_utils::test::Op;

    #[test]
    fn test_walk_to_end() {
        let code = [Op::Nop, Op::Nop, Op::End];
        let mut cursor = Cursor::new(&code);
        assert!(!cursor.is_last());

        cursor = cursor.advance().unwrap();
        cursor = cursor.advance().unwrap();
        assert_eq!(InstrCursor::position(&cursor), 2);
        assert!(cursor.is_last());
        assert!(cursor.advance().is_none());
    }

    #[test]
    fn test_at_bounds() {
        let code = [Op::Nop, Op::End];
        assert!(Cursor::at(&code, 1).is_some());
        assert!(Cursor::at(&code, 2).is_none());
        assert!(Cursor::<Op>::at(&[], 0).is_none());
    }

    #[test]
    fn test_equality_is_by_sequence_and_position() {
        let a = [Op::Nop, Op::End];
        let b = [Op::Nop, Op::End];
        assert_eq!(Cursor::new(&a), Cursor::at(&a, 0).unwrap());
        assert_ne!(Cursor::new(&a), Cursor::new(&b));
        assert_ne!(Cursor::new(&a), Cursor::at(&a, 1).unwrap());
    }
}
