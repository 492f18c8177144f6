//! Execution stack benchmarks.
//!
//! These benchmarks measure the operand push/pop path, frame entry and
//! teardown, and tail-call frame reuse.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use wasmstack::{Cursor, ExecutionStack, RegionEnd, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Nop,
    End,
}

impl RegionEnd for Op {
    fn ends_region(&self) -> bool {
        *self == Op::End
    }
}

struct Module;

const CODE: [Op; 2] = [Op::Nop, Op::End];

fn bench_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("operands");
    for depth in [16, 256, 4096] {
        group.bench_with_input(BenchmarkId::new("push_pop", depth), &depth, |b, &n| {
            let mut stack: ExecutionStack<Module, Cursor<Op>> = ExecutionStack::new();
            b.iter(|| {
                for i in 0..n {
                    stack.push(Value::I64(i as i64));
                }
                for _ in 0..n {
                    black_box(stack.pop());
                }
            });
        });
    }
    group.finish();
}

fn bench_call_return(c: &mut Criterion) {
    let module = Module;
    let resume = Cursor::new(&CODE);

    let mut group = c.benchmark_group("frames");
    for depth in [1, 16, 256] {
        group.bench_with_input(BenchmarkId::new("call_return", depth), &depth, |b, &n| {
            let mut stack = ExecutionStack::new();
            b.iter(|| {
                for _ in 0..n {
                    stack.push(Value::I32(1));
                    stack.push(Value::I32(2));
                    stack.push_frame(&module, resume, 2, 1);
                    stack.push(Value::I32(3));
                }
                for _ in 0..n {
                    black_box(stack.pop_frame());
                }
                stack.reset();
            });
        });
    }
    group.finish();
}

fn bench_tail_calls(c: &mut Criterion) {
    let module = Module;
    let resume = Cursor::new(&CODE);

    let mut group = c.benchmark_group("frames");
    for calls in [100, 10_000] {
        group.bench_with_input(BenchmarkId::new("tail_call", calls), &calls, |b, &n| {
            let mut stack = ExecutionStack::new();
            b.iter(|| {
                stack.push(Value::I32(0));
                stack.push(Value::I32(0));
                stack.push_frame(&module, resume, 2, 1);
                for i in 0..n {
                    stack.push(Value::I32(i));
                    stack.push(Value::I32(i));
                    stack.push_tail_frame(&module, 2, 1);
                }
                black_box(stack.len());
                stack.reset();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_push_pop, bench_call_return, bench_tail_calls);
criterion_main!(benches);
