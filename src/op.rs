// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! Instruction-word decoding: the low two decimal digits select the
//! operation; the remaining digits, read least-significant-first, give one
//! addressing mode per parameter. Digits beyond an operation's parameter
//! count are not consulted.

use thiserror::Error;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParMode { Pos, Imm, Rel }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgPos { First, Second, Third }

impl<T> std::ops::Index<ArgPos> for [T] {
	type Output = T;
	fn index(&self, index: ArgPos) -> &Self::Output {
		match index {
			ArgPos::First => &self[0],
			ArgPos::Second => &self[1],
			ArgPos::Third => &self[2],
		}
	}
}

/// A malformed instruction word; always fatal, never skipped over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
	/// The memory word is negative or too wide to be an instruction.
	#[error("not an instruction word")]
	Format,
	/// The low two digits are not a known operation.
	#[error("unknown opcode {0}")]
	Op(u16),
	/// A parameter's mode digit is not position, immediate, or relative.
	#[error("unknown mode digit {digit} for the {arg:?} parameter")]
	ParMode { digit: u8, arg: ArgPos },
	/// Immediate mode on a parameter that is written to.
	#[error("immediate mode on the {arg:?} parameter, a write destination")]
	ImmWrite { arg: ArgPos },
}

/// Whether a write destination is relative-mode (it is positional otherwise;
/// immediate destinations are rejected while decoding).
type IsRelDest = bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
	Add([ParMode; 2], IsRelDest),
	Mul([ParMode; 2], IsRelDest),
	In(IsRelDest),
	Out(ParMode),
	JumpIf(bool, [ParMode; 2]),
	Lt([ParMode; 2], IsRelDest),
	Eq([ParMode; 2], IsRelDest),
	RelAdj(ParMode),
	Halt,
}

const PAR_MODE_COEFFS: [u16; 3] = [1, 10, 100];

impl TryFrom<u8> for ParMode {
	type Error = u8;
	fn try_from(digit: u8) -> Result<Self, Self::Error> {
		use ParMode::*;
		match digit {
			0 => Ok(Pos),
			1 => Ok(Imm),
			2 => Ok(Rel),
			d => Err(d),
		}
	}
}

impl TryFrom<u16> for Op {
	type Error = DecodeError;
	fn try_from(word: u16) -> Result<Self, Self::Error> {
		use num_integer::Integer as _;

		let (modes, opcode) = word.div_rem(&100);

		let par_mode = |arg: ArgPos| {
			let digit = (modes / PAR_MODE_COEFFS[arg] % 10) as u8;
			ParMode::try_from(digit)
				.map_err(|digit| DecodeError::ParMode { digit, arg })
		};
		let dest_is_rel = |arg: ArgPos| match par_mode(arg)? {
			ParMode::Imm => Err(DecodeError::ImmWrite { arg }),
			mode => Ok(matches!(mode, ParMode::Rel)),
		};

		use ArgPos::*;
		match opcode {
			1 => Ok(Op::Add([par_mode(First)?, par_mode(Second)?], dest_is_rel(Third)?)),
			2 => Ok(Op::Mul([par_mode(First)?, par_mode(Second)?], dest_is_rel(Third)?)),
			3 => Ok(Op::In(dest_is_rel(First)?)),
			4 => Ok(Op::Out(par_mode(First)?)),
			5 => Ok(Op::JumpIf(true, [par_mode(First)?, par_mode(Second)?])),
			6 => Ok(Op::JumpIf(false, [par_mode(First)?, par_mode(Second)?])),
			7 => Ok(Op::Lt([par_mode(First)?, par_mode(Second)?], dest_is_rel(Third)?)),
			8 => Ok(Op::Eq([par_mode(First)?, par_mode(Second)?], dest_is_rel(Third)?)),
			9 => Ok(Op::RelAdj(par_mode(First)?)),
			99 => Ok(Op::Halt),
			op => Err(DecodeError::Op(op)),
		}
	}
}


#[cfg(test)]
mod tests {
	use super::{ArgPos, DecodeError, Op, ParMode};

	#[test]
	fn decoding() {
		use ParMode::*;
		assert_eq!(Op::try_from(1), Ok(Op::Add([Pos, Pos], false)));
		assert_eq!(Op::try_from(1002), Ok(Op::Mul([Pos, Imm], false)));
		assert_eq!(Op::try_from(21101), Ok(Op::Add([Imm, Imm], true)));
		assert_eq!(Op::try_from(3), Ok(Op::In(false)));
		assert_eq!(Op::try_from(203), Ok(Op::In(true)));
		assert_eq!(Op::try_from(104), Ok(Op::Out(Imm)));
		assert_eq!(Op::try_from(1105), Ok(Op::JumpIf(true, [Imm, Imm])));
		assert_eq!(Op::try_from(6), Ok(Op::JumpIf(false, [Pos, Pos])));
		assert_eq!(Op::try_from(1107), Ok(Op::Lt([Imm, Imm], false)));
		assert_eq!(Op::try_from(2208), Ok(Op::Eq([Rel, Rel], false)));
		assert_eq!(Op::try_from(109), Ok(Op::RelAdj(Imm)));
		assert_eq!(Op::try_from(99), Ok(Op::Halt));
		// Mode digits past an operation's last parameter are not consulted.
		assert_eq!(Op::try_from(199), Ok(Op::Halt));
		assert_eq!(Op::try_from(1004), Ok(Op::Out(Pos)));
	}

	#[test]
	fn malformed_words() {
		assert_eq!(Op::try_from(77), Err(DecodeError::Op(77)));
		assert_eq!(Op::try_from(0), Err(DecodeError::Op(0)));
		assert_eq!(Op::try_from(302),
			Err(DecodeError::ParMode { digit: 3, arg: ArgPos::First }));
		assert_eq!(Op::try_from(10001),
			Err(DecodeError::ImmWrite { arg: ArgPos::Third }));
		assert_eq!(Op::try_from(103),
			Err(DecodeError::ImmWrite { arg: ArgPos::First }));
	}
}
