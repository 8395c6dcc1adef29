// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! An “Intcode computer”: a register-free stored-program interpreter over
//! sparse, arbitrarily growable memory, with position/immediate/relative
//! parameter modes, cooperative blocking input, and step-wise execution so
//! that hosts can wire many instances into pipelines, feedback loops, or
//! packet meshes. In particular:
//! - [`Machine`] decodes and executes one instruction per [`Machine::step`],
//!   suspending (never failing) on an input instruction whose collaborator
//!   has no value yet;
//! - memory cells are any [`IntNum`], `i64` by default or
//!   `num_bigint::BigInt` where programs outgrow machine words;
//! - [`io::Channel`] wires one machine's output to another's input without
//!   reordering; scheduling across machines is entirely the host's choice;
//! - [`parsing::from_str`] turns comma-separated program text into the
//!   integer sequence seeding memory.

mod machine;
mod num;
mod op;

pub mod io;
pub mod parsing;

pub use io::{Channel, Fetch};
pub use machine::{Error, Machine, Memory, State};
pub use num::IntNum;
pub use op::{ArgPos, DecodeError, Op, ParMode};
