//! Executors for the unprefixed opcode table, grouped by instruction
//! family. Each one has the [`Executor`](super::table::Executor) shape and
//! takes its operands from the instruction record it was dispatched for.

mod alu;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;
