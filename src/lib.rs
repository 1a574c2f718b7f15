/*
 * ssaview: annotated viewer for SSA listings.
 * Copyright (C) 2022  Ruifeng Xie
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

//! Annotated viewer for SSA listings.
//!
//! Reads a program in SSA form (see [`ir::program`] for the listing format), validates it, and
//! explains it: every instruction gets a kind tag and a short description, and every value knows
//! the instructions that use it.

#![warn(missing_docs)]

pub mod ir;
pub mod analysis;
pub mod report;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::Cli;

#[cfg(test)]
mod samples;

pub use ir::{Function, Instr, Kind, Program, load_program, read_program};
pub use analysis::{analyze, describe, find_by_kind, find_function, referrers_of};
