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

//! The front-end: SSA listings, read into validated and indexed programs.
//!
//! A [`Program`] is a package with its members. Each [`Function`] is a sequence of [`Block`]s,
//! each block a sequence of [`Stmt`]s, and each statement an [`Instr`]uction optionally naming the
//! value it defines. Every value (parameter or named statement) knows its referrers: the
//! instructions using it, see [`Function::referrers`].

pub mod syntax;
pub mod instr;
pub mod block;
pub mod function;
pub mod program;

pub use instr::{Instr, Kind, Operand};
pub use block::{Block, InstrId, Stmt};
pub use function::{Function, Signature, ValueId};
pub use program::{Member, Program, load_program, read_program};
