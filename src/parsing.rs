// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! Comma-separated program text — optionally split across lines, where a
//! line may end with its separating comma, with an optional trailing
//! newline — into the integer sequence seeding memory addresses 0, 1, 2, …

use std::{mem, str::FromStr};

use thiserror::Error;

use crate::num::IntNum;


/// A program word that did not parse, at 1-based `column` of the source
/// (counting one separator between words).
#[derive(Debug, Error)]
#[error("invalid program word at column {column}")]
pub struct ProgramError<Err: std::error::Error + 'static> {
	pub column: usize,
	pub source: Err,
}

pub fn from_str<Num>(s: &str) -> Result<Vec<Num>, ProgramError<<Num as FromStr>::Err>>
where Num: IntNum, <Num as FromStr>::Err: std::error::Error + 'static {
	use itertools::Itertools as _;

	let program = s.lines()
		.flat_map(|line|
			if line.ends_with(',') { line.chars().dropping_back(1).as_str() }
			else { line }
				.split(','))
		.scan(0, |c, word| Some((mem::replace(c, *c + word.len() + 1), word)))
		.map(|(c, word)| word.parse()
			.map_err(|source| ProgramError { column: c + 1, source }))
		.collect::<Result<Vec<Num>, _>>()?;
	if program.is_empty() {
		return Err(ProgramError { column: 1, source: Num::from_str("").unwrap_err() })
	}
	Ok(program)
}
