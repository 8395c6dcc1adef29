// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! Memory-cell integers: `i64` for well-behaved programs, `num_bigint::BigInt`
//! where values outgrow machine words. Every cell and every computation uses
//! the same type, so a `BigInt` machine is exact at any magnitude.

use std::{fmt::Debug, ops::{Add, Mul}, str::FromStr};


pub trait IntNum: Clone + Default + Debug + FromStr
	+ PartialEq<Self> + PartialOrd<Self>
	+ Add<Self, Output = Self> + Mul<Self, Output = Self> {

	/// Comparison results: `true` is one, `false` is zero (the [`Default`]).
	fn from_bool(b: bool) -> Self;

	fn from_i64(int: i64) -> Self;

	/// The low decimal digits as an instruction word, or `None` if `self` is
	/// negative or too wide to be one.
	fn try_to_instr(&self) -> Option<u16>;

	/// Memory address or signed offset, or `None` if `self` is out of range.
	fn try_to_isize(&self) -> Option<isize>;
}

impl IntNum for i64 {
	fn from_bool(b: bool) -> Self {
		Self::from(b)
	}

	fn from_i64(int: i64) -> Self {
		int
	}

	fn try_to_instr(&self) -> Option<u16> {
		u16::try_from(*self).ok()
	}

	fn try_to_isize(&self) -> Option<isize> {
		isize::try_from(*self).ok()
	}
}

impl IntNum for num_bigint::BigInt {
	fn from_bool(b: bool) -> Self {
		Self::from(i32::from(b))
	}

	fn from_i64(int: i64) -> Self {
		Self::from(int)
	}

	fn try_to_instr(&self) -> Option<u16> {
		u16::try_from(self.clone()).ok()
	}

	fn try_to_isize(&self) -> Option<isize> {
		isize::try_from(self.clone()).ok()
	}
}
