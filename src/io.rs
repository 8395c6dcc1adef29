// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! Host-side plumbing: the input collaborator's result type, single-threaded
//! FIFO channels for wiring machines into pipelines and feedback loops, and
//! a run-to-completion convenience for fixed inputs. Scheduling across
//! machines stays with the host — round-robin, polling, or anything else.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use thiserror::Error;

use crate::{machine::{Error as MachineError, Machine, State}, num::IntNum};


/// What an input collaborator produced: the next value, or nothing yet — in
/// which case the machine suspends and retries the same input instruction on
/// a later step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetch<Num> {
	Ready(Num),
	Pending,
}

/// A clonable handle to a shared FIFO queue; use one handle as some
/// machine's output and another as the next machine's input. Values arrive
/// in the order they were pushed, never reordered. Strictly single-threaded;
/// hosts spreading machines across threads must bring their own synchronized
/// queues instead.
pub struct Channel<Num>(Rc<RefCell<VecDeque<Num>>>);

impl<Num> Clone for Channel<Num> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}

impl<Num> Default for Channel<Num> {
	fn default() -> Self {
		Self::new()
	}
}

impl<Num> Channel<Num> {
	pub fn new() -> Self {
		Self(Rc::new(RefCell::new(VecDeque::new())))
	}

	pub fn seeded(values: impl IntoIterator<Item = Num>) -> Self {
		Self(Rc::new(RefCell::new(values.into_iter().collect())))
	}

	pub fn push(&self, num: Num) {
		self.0.borrow_mut().push_back(num)
	}

	pub fn pop(&self) -> Option<Num> {
		self.0.borrow_mut().pop_front()
	}

	pub fn len(&self) -> usize {
		self.0.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.borrow().is_empty()
	}

	/// The next queued value, or the suspension signal.
	pub fn fetch(&self) -> Fetch<Num> {
		match self.pop() {
			Some(num) => Fetch::Ready(num),
			None => Fetch::Pending,
		}
	}

	/// The next queued value, or `empty` — for hosts that hand an idle
	/// sentinel to a starved machine instead of suspending it.
	pub fn fetch_or(&self, empty: Num) -> Fetch<Num> {
		Fetch::Ready(self.pop().unwrap_or(empty))
	}

	/// An input collaborator draining this channel, suspending when dry.
	pub fn input_fn(&self) -> impl FnMut() -> Fetch<Num> {
		let recv = self.clone();
		move || recv.fetch()
	}

	/// An output collaborator appending to this channel.
	pub fn output_fn(&self) -> impl FnMut(Num) {
		let send = self.clone();
		move |num| send.push(num)
	}
}


/// Failure surfaced by [`run_with`]: the machine itself failed, or it asked
/// for input after the fixed queue ran dry.
#[derive(Debug, Error)]
pub enum RunError {
	#[error(transparent)]
	Machine(#[from] MachineError),
	#[error("input exhausted at position {ip}")]
	InputExhausted { ip: usize },
}

/// Runs `program` to completion against a fixed input queue, collecting
/// every output in production order. Exhausting the queue before the program
/// stops asking is an error here; hosts wanting suspend/resume instead drive
/// a [`Machine`] with [`Channel`]s directly.
pub fn run_with<Num: IntNum>(
	program: impl IntoIterator<Item = Num>,
	inputs: impl IntoIterator<Item = Num>,
) -> Result<Vec<Num>, RunError> {
	let inputs = Channel::seeded(inputs);
	let outputs = Rc::new(RefCell::new(Vec::new()));
	let collected = Rc::clone(&outputs);
	let mut machine = Machine::new(program)
		.with_input(inputs.input_fn())
		.with_output(move |num| collected.borrow_mut().push(num));
	match machine.run()? {
		State::Blocked => Err(RunError::InputExhausted { ip: machine.ip() }),
		_ => Ok(outputs.take()),
	}
}


#[cfg(test)]
mod tests {
	use crate::parsing;
	use super::*;

	fn program(s: &str) -> Vec<i64> {
		parsing::from_str(s).unwrap()
	}

	fn drained(channel: &Channel<i64>) -> Vec<i64> {
		std::iter::from_fn(|| channel.pop()).collect()
	}

	#[test]
	fn channels_preserve_order() {
		let upstream = Channel::new();
		let downstream = Channel::new();

		// An echo of three values, started before its producer has run.
		let mut echo = Machine::new(program("3,13,4,13,3,13,4,13,3,13,4,13,99,0"))
			.with_input(upstream.input_fn())
			.with_output(downstream.output_fn());
		assert_eq!(echo.run().unwrap(), State::Blocked);

		let mut producer = Machine::new(program("104,1,104,2,104,3,99"))
			.with_output(upstream.output_fn());
		assert_eq!(producer.run().unwrap(), State::Halted);
		assert_eq!(upstream.len(), 3);

		assert_eq!(echo.run().unwrap(), State::Halted);
		assert!(upstream.is_empty());
		assert_eq!(drained(&downstream), [1, 2, 3]);
	}

	#[test]
	fn idle_sentinel() {
		let source = Channel::new();
		let sink = Channel::new();
		let recv = source.clone();
		let mut machine = Machine::new(program("3,9,3,10,4,9,4,10,99,0,0"))
			.with_input(move || recv.fetch_or(-1))
			.with_output(sink.output_fn());
		source.push(7);
		assert_eq!(machine.run().unwrap(), State::Halted);
		assert_eq!(drained(&sink), [7, -1]);
	}

	#[test]
	fn exhausted_inputs() {
		let err = run_with(program("3,5,3,6,99"), [1]).unwrap_err();
		assert!(matches!(err, RunError::InputExhausted { ip: 2 }));
		assert!(matches!(run_with(program("1,0,0,0,77"), []).unwrap_err(),
			RunError::Machine(MachineError::Decode { ip: 4, .. })));
	}

	fn chained_signal(program: &[i64], phases: &[i64]) -> i64 {
		use itertools::Itertools as _;
		phases.iter().fold(0, |signal, &phase|
			run_with(program.iter().cloned(), [phase, signal]).unwrap()
				.into_iter().exactly_one().unwrap())
	}

	fn best_chained_signal(s: &str) -> i64 {
		use itertools::Itertools as _;
		let program = program(s);
		(0..=4).permutations(5)
			.map(|phases| chained_signal(&program, &phases))
			.max().unwrap()
	}

	#[test]
	fn amplifier_chains() {
		assert_eq!(best_chained_signal(
			"3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0"), 43210);
		assert_eq!(best_chained_signal(
			"3,23,3,24,1002,24,10,24,1002,23,-1,23,101,5,23,23,1,24,23,23,4,23,99,0,0"), 54321);
		assert_eq!(best_chained_signal(
			"3,31,3,32,1002,32,10,32,1001,31,-2,31,1007,31,0,33,1002,33,7,33,1,33,31,31,1,32,31,31,4,31,99,0,0,0"), 65210);
	}

	fn feedback_signal(s: &str, phases: [i64; 5]) -> i64 {
		let program = program(s);
		let channels = phases.map(|phase| Channel::seeded([phase]));
		channels[0].push(0);

		let mut machines = (0..channels.len())
			.map(|i| Machine::new(program.clone())
				.with_input(channels[i].input_fn())
				.with_output(channels[(i + 1) % channels.len()].output_fn()))
			.collect::<Vec<_>>();

		while !machines.iter().all(|machine| machine.is_halted()) {
			for machine in &mut machines {
				machine.run().unwrap();
			}
		}
		channels[0].pop().unwrap()
	}

	#[test]
	fn feedback_loops() {
		assert_eq!(feedback_signal(
			"3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,27,4,27,1001,28,-1,28,1005,28,6,99,0,0,5",
			[9, 8, 7, 6, 5]), 139629729);
		assert_eq!(feedback_signal(indoc::indoc! { "
				3,52,1001,52,-5,52,3,53,1,52,56,54,1007,54,5,55,1005,55,26,1001,54,
				-5,54,1105,1,12,1,53,54,53,1008,54,0,55,1001,55,1,55,2,53,55,53,4,
				53,1001,56,-1,56,1005,56,6,99,0,0,0,0,10
			" },
			[9, 7, 8, 5, 6]), 18216);
	}
}
