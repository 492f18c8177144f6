//! The execution stack of a WebAssembly interpreter.
//!
//! wasmstack holds the runtime state of a running WebAssembly function:
//! operand values, the storage width of each operand, and the call and
//! label frames. It is driven by an interpreter loop over bytecode that
//! has already been validated, so its operations take their preconditions
//! on trust and panic when a caller breaks one.
//!
//! # Modules
//!
//! - [`runtime::stack`] -- [`ExecutionStack`]: operand, tag and frame operations.
//! - [`runtime::value`] -- [`Value`], [`ValueType`] and the width [`TypeTag`].
//! - [`runtime::frame`] -- [`Frame`], one activation record.
//! - [`runtime::cursor`] -- the program counter interface the stack consumes.
//! - [`runtime::snapshot`] -- whole-state checkpoint, restore and migration images.
//! - [`runtime::config`] -- initial capacities.
//!
//! # Example
//!
//! Call a function with two locals that leaves one result:
//!
//! ```
//! use wasmstack::{Cursor, ExecutionStack, RegionEnd, Value};
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! enum Op { Nop, End }
//!
//! impl RegionEnd for Op {
//!     fn ends_region(&self) -> bool { *self == Op::End }
//! }
//!
//! struct Module;
//!
//! let module = Module;
//! let caller = [Op::Nop, Op::Nop, Op::End];
//! let return_to = Cursor::at(&caller, 1).unwrap();
//!
//! let mut stack = ExecutionStack::new();
//! stack.push(Value::I32(2));
//! stack.push(Value::I32(3));
//! stack.push_frame(&module, return_to, 2, 1);
//! stack.push(Value::I32(5));
//!
//! assert_eq!(stack.pop_frame(), return_to);
//! assert_eq!(stack.values(), &[Value::I32(5)]);
//! ```

pub mod runtime;

pub use runtime::{
    Cursor, ExecutionStack, Frame, FrameImage, InstrCursor, RegionEnd, SnapshotImage, StackConfig, StackError,
    StackSnapshot, TypeTag, Value, ValueType,
};
