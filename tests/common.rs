//! Common test utilities shared between integration tests

#![allow(dead_code)]

use wasmstack::{Cursor, ExecutionStack, RegionEnd, Value};

/// Instructions of the toy bytecode the integration tests drive the stack with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Nop,
    Const(i32),
    /// Push a copy of the value `n` slots from the top (1 is the top)
    Pick(usize),
    Add,
    Sub,
    /// Pop a condition and jump to the absolute position if it is zero
    JumpIfZero(usize),
    /// Enter a label whose `End` sits at the absolute position `end`
    Block { arity: usize, end: usize },
    Call(usize),
    ReturnCall(usize),
    End,
}

impl RegionEnd for Op {
    fn ends_region(&self) -> bool {
        *self == Op::End
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Func {
    pub entry: usize,
    pub params: usize,
    pub results: usize,
}

/// A module instance with all function bodies in one instruction sequence
#[derive(Debug)]
pub struct Module {
    pub code: Vec<Op>,
    pub funcs: Vec<Func>,
}

impl Module {
    pub fn new(code: Vec<Op>, funcs: Vec<Func>) -> Self {
        Module { code, funcs }
    }

    /// A module with a single `End`, enough to hand out cursors
    pub fn empty() -> Self {
        Module::new(vec![Op::Nop, Op::End], Vec::new())
    }

    pub fn cursor(&self, pos: usize) -> Cursor<'_, Op> {
        Cursor::at(&self.code, pos).expect("position inside module code")
    }

    /// Whether `cursor` points into this module's code
    pub fn owns(&self, cursor: &Cursor<'_, Op>) -> bool {
        std::ptr::eq(cursor.code(), self.code.as_slice())
    }
}

pub type Stack<'m> = ExecutionStack<'m, Module, Cursor<'m, Op>>;

pub fn i32s(values: &[i32]) -> Vec<Value> {
    values.iter().copied().map(Value::I32).collect()
}
