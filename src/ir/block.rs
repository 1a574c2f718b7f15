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

//! Basic blocks, and related API.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use parse_display::{Display, FromStr, ParseError};

use crate::ir::instr::{Instr, Temp};

/// Position of an instruction: its block, and its index within that block.
#[derive(Debug, Display, FromStr, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[display("{block}:{index}")]
pub struct InstrId {
    /// Index of the block in its function.
    pub block: usize,
    /// Index of the instruction in its block.
    pub index: usize,
}

/// One line of a block: an [`Instr`]uction, named `tN` if it defines a value.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Stmt {
    /// Name of the value defined by this instruction, if any.
    pub result: Option<Temp>,
    /// The instruction.
    pub instr: Instr,
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = self.result { write!(f, "{} = ", t)?; }
        write!(f, "{}", self.instr)
    }
}

impl FromStr for Stmt {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((lhs, rhs)) = s.split_once(" = ") {
            if let Ok(t) = lhs.parse() {
                return Ok(Stmt { result: Some(t), instr: rhs.parse()? });
            }
        }
        Ok(Stmt { result: None, instr: s.parse()? })
    }
}

/// Basic block.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Block {
    /// Position of this block in its function.
    pub index: usize,
    /// Free-form description, e.g. `entry` or `if.then`.
    pub comment: String,
    /// All the statements in this basic block.
    pub stmts: Vec<Stmt>,
}

impl Block {
    /// Get iterator into statements with their [`InstrId`]s.
    pub fn indexed(&self) -> impl Iterator<Item=(InstrId, &Stmt)> + '_ {
        let block = self.index;
        self.stmts.iter().enumerate()
            .map(move |(index, stmt)| (InstrId { block, index }, stmt))
    }
    /// The control transfer instruction ending this block.
    pub fn terminator(&self) -> Option<&Instr> {
        self.stmts.last().map(|stmt| &stmt.instr).filter(|instr| instr.is_terminator())
    }
}
