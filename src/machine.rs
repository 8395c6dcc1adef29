// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! The machine proper: sparse memory, an instruction pointer, a relative
//! base, and two host-supplied collaborators. [`Machine::step`] executes
//! exactly one instruction; hosts compose many machines by stepping each in
//! whatever order suits them, treating [`State::Blocked`] as “pause this
//! machine, come back later.”

use std::collections::HashMap;

use thiserror::Error;

use crate::{
	io::Fetch,
	num::IntNum,
	op::{ArgPos, DecodeError, Op, ParMode},
};


/// Unbounded sparse memory: the seed program in a dense prefix, every higher
/// address in a map defaulting to zero.
pub struct Memory<Num> {
	base: Vec<Num>,
	ext: HashMap<usize, Num>,
}

impl<Num: IntNum> Memory<Num> {
	fn new(program: impl IntoIterator<Item = Num>) -> Self {
		Self { base: program.into_iter().collect(), ext: HashMap::new() }
	}

	pub fn read(&self, addr: usize) -> Num {
		if addr < self.base.len() { self.base[addr].clone() }
		else { self.ext.get(&addr).cloned().unwrap_or_default() }
	}

	pub fn write(&mut self, addr: usize, num: Num) {
		if addr < self.base.len() { self.base[addr] = num }
		else { self.ext.insert(addr, num); }
	}
}


/// A fatal condition: a malformed program, or a collaborator missing for an
/// opcode that executed. A pending input is not an error; see
/// [`State::Blocked`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
	/// The word at the instruction pointer is not a valid instruction.
	#[error("invalid instruction at position {ip}: {source}")]
	Decode { ip: usize, source: DecodeError },
	/// A computed effective address is negative.
	#[error("invalid memory address {addr} at position {ip}")]
	Addr { ip: usize, addr: isize },
	/// A word used as an address or offset does not fit the address space.
	#[error("unaddressable word at position {ip}")]
	Unaddressable { ip: usize },
	/// An input instruction executed with no input collaborator set.
	#[error("input requested at position {ip} without an input collaborator")]
	NoInput { ip: usize },
	/// An output instruction executed with no output collaborator set.
	#[error("output produced at position {ip} without an output collaborator")]
	NoOutput { ip: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State { Running, Blocked, Halted }


type InputFn<'h, Num> = Box<dyn FnMut() -> Fetch<Num> + 'h>;
type OutputFn<'h, Num> = Box<dyn FnMut(Num) + 'h>;

/// A single interpreter instance. Strictly single-threaded and synchronous:
/// [`step`](Self::step) performs one instruction and returns. The machine
/// exclusively owns its memory; collaborators (and anything they close over,
/// like shared queues) stay owned by the host.
pub struct Machine<'h, Num = i64> {
	ip: usize,
	rel_base: isize,
	memory: Memory<Num>,
	halted: bool,
	blocked: bool,
	steps: usize,
	input: Option<InputFn<'h, Num>>,
	output: Option<OutputFn<'h, Num>>,
}

impl<'h, Num: IntNum> Machine<'h, Num> {
	pub fn new(program: impl IntoIterator<Item = Num>) -> Self {
		Self {
			ip: 0,
			rel_base: 0,
			memory: Memory::new(program),
			halted: false,
			blocked: false,
			steps: 0,
			input: None,
			output: None,
		}
	}

	/// Attaches the input collaborator, invoked whenever an input instruction
	/// executes. Returning [`Fetch::Pending`] suspends the machine instead of
	/// consuming anything. Leaving it unset is only safe if the program never
	/// executes an input instruction.
	pub fn with_input(mut self, input: impl FnMut() -> Fetch<Num> + 'h) -> Self {
		self.input = Some(Box::new(input));
		self
	}

	/// Attaches the output collaborator, invoked once per produced value; its
	/// side effects are entirely the host's business.
	pub fn with_output(mut self, output: impl FnMut(Num) + 'h) -> Self {
		self.output = Some(Box::new(output));
		self
	}

	pub fn state(&self) -> State {
		if self.halted { State::Halted }
		else if self.blocked { State::Blocked }
		else { State::Running }
	}

	pub fn is_halted(&self) -> bool {
		self.halted
	}

	pub fn ip(&self) -> usize {
		self.ip
	}

	pub fn rel_base(&self) -> isize {
		self.rel_base
	}

	/// Number of [`step`](Self::step) calls so far, counting suspended input
	/// attempts and the halting step, but not calls after the halt.
	pub fn steps(&self) -> usize {
		self.steps
	}

	pub fn memory(&self) -> &Memory<Num> {
		&self.memory
	}

	/// Mutable memory access, e.g. to poke seed addresses before running.
	pub fn memory_mut(&mut self) -> &mut Memory<Num> {
		&mut self.memory
	}

	/// The raw word of the parameter at `arg`.
	fn raw(&self, arg: ArgPos) -> Num {
		self.memory.read(self.ip + 1 + arg as usize)
	}

	fn to_addr(&self, num: &Num) -> Result<usize, Error> {
		let int = num.try_to_isize().ok_or(Error::Unaddressable { ip: self.ip })?;
		usize::try_from(int).map_err(|_| Error::Addr { ip: self.ip, addr: int })
	}

	/// Effective address under relative mode.
	fn rel(&self, raw: &Num) -> Result<usize, Error> {
		let delta = raw.try_to_isize().ok_or(Error::Unaddressable { ip: self.ip })?;
		let addr = self.rel_base + delta;
		usize::try_from(addr).map_err(|_| Error::Addr { ip: self.ip, addr })
	}

	/// Effective value of the readable parameter at `arg`.
	fn arg(&self, arg: ArgPos, par_mode: ParMode) -> Result<Num, Error> {
		let raw = self.raw(arg);
		Ok(match par_mode {
			ParMode::Pos => self.memory.read(self.to_addr(&raw)?),
			ParMode::Imm => raw,
			ParMode::Rel => self.memory.read(self.rel(&raw)?),
		})
	}

	/// Effective address of the write destination at `arg`.
	fn dest(&self, arg: ArgPos, is_rel: bool) -> Result<usize, Error> {
		let raw = self.raw(arg);
		if is_rel { self.rel(&raw) } else { self.to_addr(&raw) }
	}

	/// Decodes and executes exactly one instruction, returning `Ok(false)`
	/// exactly when it was the stop instruction (after which further calls
	/// are no-ops returning `Ok(false)`). An input instruction whose
	/// collaborator has no value yet mutates nothing — the pointer stays on
	/// the instruction so the next call re-decodes and retries it, and
	/// [`state`](Self::state) reports [`State::Blocked`] until then.
	pub fn step(&mut self) -> Result<bool, Error> {
		use {ArgPos::*, Op::*};

		if self.halted { return Ok(false) }
		self.steps += 1;
		self.blocked = false;

		let ip = self.ip;
		let op = self.memory.read(ip).try_to_instr()
			.ok_or(DecodeError::Format)
			.and_then(Op::try_from)
			.map_err(|source| Error::Decode { ip, source })?;

		#[cfg(LOGGING)]
		println!("{ip}: {op:?} (base {})", self.rel_base);

		match op {
			op @ (Add(par_modes, dest_rel)
					| Mul(par_modes, dest_rel)
					| Lt(par_modes, dest_rel)
					| Eq(par_modes, dest_rel)) => {
				let arg0 = self.arg(First, par_modes[First])?;
				let arg1 = self.arg(Second, par_modes[Second])?;
				let dest = self.dest(Third, dest_rel)?;
				let num = match op {
					Add(..) => arg0 + arg1,
					Mul(..) => arg0 * arg1,
					Lt(..) => Num::from_bool(arg0 < arg1),
					Eq(..) => Num::from_bool(arg0 == arg1),
					_ => unreachable!(),
				};
				self.memory.write(dest, num);
				self.ip += 4;
			}
			In(dest_rel) => {
				let dest = self.dest(First, dest_rel)?;
				let input = self.input.as_mut().ok_or(Error::NoInput { ip })?;
				match input() {
					Fetch::Ready(num) => {
						self.memory.write(dest, num);
						self.ip += 2;
					}
					// Retried from scratch on the next call.
					Fetch::Pending => self.blocked = true,
				}
			}
			Out(par_mode) => {
				let num = self.arg(First, par_mode)?;
				let output = self.output.as_mut().ok_or(Error::NoOutput { ip })?;
				output(num);
				self.ip += 2;
			}
			JumpIf(flag, par_modes) => {
				if (self.arg(First, par_modes[First])? != Num::default()) == flag {
					let target = self.arg(Second, par_modes[Second])?;
					self.ip = self.to_addr(&target)?;
				} else {
					self.ip += 3;
				}
			}
			RelAdj(par_mode) => {
				let delta = self.arg(First, par_mode)?;
				self.rel_base += delta.try_to_isize()
					.ok_or(Error::Unaddressable { ip })?;
				self.ip += 2;
			}
			Halt => {
				self.ip += 1;
				self.halted = true;
				return Ok(false)
			}
		}

		Ok(true)
	}

	/// Repeatedly [`step`](Self::step)s until the machine halts or suspends
	/// on input, returning the state that stopped it. Hosts driving several
	/// machines call this once per scheduling round; with always-ready input
	/// a single call runs to [`State::Halted`].
	pub fn run(&mut self) -> Result<State, Error> {
		while self.step()? {
			if self.blocked { break }
		}
		Ok(self.state())
	}
}
