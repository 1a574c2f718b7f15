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

//! Functions: signatures, validation, and the def-use (referrer) index.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use derivative::Derivative;
use displaydoc::Display as DisplayDoc;
use itertools::Itertools;
use parse_display::{Display, FromStr};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::control_flow::{ControlFlow, NextBlocks};
use crate::ir::syntax::split_list;
use super::{Block, Instr, InstrId, Stmt};
use super::instr::{Operand, Output, Temp};

/// Functions that every program may call without declaring them.
pub const BUILTINS: &[&str] = &[
    "append", "cap", "close", "complex", "copy", "delete", "imag", "len",
    "new", "panic", "print", "println", "real", "recover",
];

/// Width of the SSA dump, block comments are right-aligned to it.
const PUNCHCARD: usize = 79;

/// A formal parameter, `name type`.
#[derive(Debug, Display, FromStr, Clone, Eq, PartialEq)]
#[display("{name} {ty}")]
#[allow(missing_docs)]
pub struct Param {
    pub name: String,
    pub ty: String,
}

/// Function signature.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Signature {
    /// Formal parameters, in order.
    pub params: Vec<Param>,
    /// Result type(s), as written: empty, a single type, or a parenthesised list.
    pub results: String,
}

impl Signature {
    /// Number of values a `return` in this function must provide.
    pub fn result_count(&self) -> usize {
        match self.results.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
            Some(list) => split_list(list).len(),
            None if self.results.is_empty() => 0,
            None => 1,
        }
    }

    /// Everything after `func` (and the function name, if any): `(params) results`.
    fn fmt_tail(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.params.iter().format(", "))?;
        if !self.results.is_empty() { write!(f, " {}", self.results)?; }
        Ok(())
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "func")?;
        self.fmt_tail(f)
    }
}

/// Identity of a value with a referrer set.
#[derive(Debug, Display, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum ValueId {
    /// The `k`-th formal parameter.
    #[display("param #{0}")]
    Param(usize),
    /// The value defined by an instruction.
    #[display("instr {0}")]
    Instr(InstrId),
}

/// A function, validated and indexed.
#[derive(Derivative, Clone)]
#[derivative(Debug, PartialEq, Eq)]
pub struct Function {
    /// Name of this function.
    pub name: String,
    /// Name of the package containing this function.
    pub package: String,
    /// Signature of this function.
    pub signature: Signature,
    /// All basic blocks in this function, the first one being the entry. External functions
    /// have no blocks.
    pub blocks: Vec<Block>,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    temps: BTreeMap<Temp, InstrId>,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    referrers: BTreeMap<ValueId, Vec<InstrId>>,
}

/// function `{function}`: {kind}
#[derive(Debug, DisplayDoc, Error, Eq, PartialEq)]
pub struct Error {
    /// Name of the offending function.
    pub function: String,
    /// What is wrong with it.
    pub kind: ErrorKind,
}

/// All kinds of validation failures.
#[derive(Debug, DisplayDoc, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum ErrorKind {
    /// block #{actual} appears at position {expected}
    BlockIndex { expected: usize, actual: usize },
    /// block #{0} is empty
    EmptyBlock(usize),
    /// block #{0} does not end with a control transfer instruction
    MissingTerminator(usize),
    /// control transfer instruction at {0} is not the last one of its block
    MisplacedTerminator(InstrId),
    /// instruction at {at} refers to block #{target}, which does not exist
    InvalidTarget { at: InstrId, target: usize },
    /// undefined: {name} (at {at})
    Undefined { at: InstrId, name: String },
    /// {0} is defined more than once
    Redefined(Temp),
    /// duplicate parameter `{0}`
    DuplicateParam(String),
    /// instruction at {0} produces a value, but has no result name
    MissingResult(InstrId),
    /// instruction at {at} produces no value, but is named {temp}
    UnexpectedResult { at: InstrId, temp: Temp },
    /// wrong number of return values at {at} (have {actual}, want {expected})
    ReturnArity { at: InstrId, expected: usize, actual: usize },
}

impl Function {
    /// Validate the blocks of a function, and build its referrer index.
    ///
    /// `members` are the names of all package members, which (together with [`BUILTINS`] and the
    /// parameters) are the names an instruction may refer to.
    pub fn new(name: String, package: String, signature: Signature, blocks: Vec<Block>,
               members: &BTreeSet<String>) -> Result<Function, Error> {
        let mut function = Function {
            name,
            package,
            signature,
            blocks,
            temps: BTreeMap::new(),
            referrers: BTreeMap::new(),
        };
        function.validate(members)
            .map_err(|kind| Error { function: function.name.clone(), kind })?;
        if !function.is_external() {
            let reachable = function.collect_reachable(0);
            for k in (0..function.block_count()).filter(|k| reachable.binary_search(k).is_err()) {
                warn!(function = %function.name, block = k, "unreachable block");
            }
        }
        debug!(function = %function.name, blocks = function.block_count(),
               instructions = function.instr_count(), "function validated");
        Ok(function)
    }

    fn validate(&mut self, members: &BTreeSet<String>) -> Result<(), ErrorKind> {
        self.check_blocks()?;
        self.index_values()?;
        self.index_referrers(members)
    }

    fn check_blocks(&self) -> Result<(), ErrorKind> {
        let result_count = self.signature.result_count();
        for (k, block) in self.blocks.iter().enumerate() {
            if block.index != k {
                return Err(ErrorKind::BlockIndex { expected: k, actual: block.index });
            }
            for (id, stmt) in block.indexed() {
                if stmt.instr.is_terminator() && id.index + 1 != block.stmts.len() {
                    return Err(ErrorKind::MisplacedTerminator(id));
                }
                if let Some(target) = stmt.instr.block_refs().into_iter()
                    .find(|&target| target >= self.blocks.len()) {
                    return Err(ErrorKind::InvalidTarget { at: id, target });
                }
                if let Instr::Return(ret) = &stmt.instr {
                    if ret.results.len() != result_count {
                        return Err(ErrorKind::ReturnArity {
                            at: id,
                            expected: result_count,
                            actual: ret.results.len(),
                        });
                    }
                }
            }
            match block.stmts.last() {
                None => return Err(ErrorKind::EmptyBlock(k)),
                Some(last) if !last.instr.is_terminator() =>
                    return Err(ErrorKind::MissingTerminator(k)),
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn index_values(&mut self) -> Result<(), ErrorKind> {
        let mut seen = BTreeSet::new();
        for (k, param) in self.signature.params.iter().enumerate() {
            if !seen.insert(param.name.as_str()) {
                return Err(ErrorKind::DuplicateParam(param.name.clone()));
            }
            self.referrers.insert(ValueId::Param(k), Vec::new());
        }
        for block in &self.blocks {
            for (id, stmt) in block.indexed() {
                match (stmt.instr.output(), stmt.result) {
                    (Output::Always, None) => return Err(ErrorKind::MissingResult(id)),
                    (Output::Never, Some(temp)) =>
                        return Err(ErrorKind::UnexpectedResult { at: id, temp }),
                    (_, Some(temp)) => {
                        if self.temps.insert(temp, id).is_some() {
                            return Err(ErrorKind::Redefined(temp));
                        }
                        self.referrers.insert(ValueId::Instr(id), Vec::new());
                    }
                    (_, None) => {}
                }
            }
        }
        Ok(())
    }

    /// Record every instruction as a referrer of the values it uses, once per instruction, in
    /// program order.
    fn index_referrers(&mut self, members: &BTreeSet<String>) -> Result<(), ErrorKind> {
        for block in &self.blocks {
            for (id, stmt) in block.indexed() {
                let mut used = SmallVec::<[ValueId; 3]>::new();
                for operand in stmt.instr.get_operands() {
                    let value = match operand {
                        Operand::Const(_) => continue,
                        Operand::Temp(t) => match self.temps.get(t) {
                            Some(&def) => ValueId::Instr(def),
                            None => return Err(ErrorKind::Undefined { at: id, name: t.to_string() }),
                        },
                        Operand::Name(x) => match self.signature.params.iter().position(|p| &p.name == x) {
                            Some(k) => ValueId::Param(k),
                            None if members.contains(x) || BUILTINS.contains(&x.as_str()) => continue,
                            None => return Err(ErrorKind::Undefined { at: id, name: x.clone() }),
                        },
                    };
                    if !used.contains(&value) { used.push(value); }
                }
                for value in used {
                    self.referrers.entry(value).or_default().push(id);
                }
            }
        }
        Ok(())
    }

    /// Whether this function is only declared here (it has no body).
    pub fn is_external(&self) -> bool { self.blocks.is_empty() }

    /// Total number of instructions in this function.
    pub fn instr_count(&self) -> usize {
        self.blocks.iter().map(|block| block.stmts.len()).sum()
    }

    /// The statement at the given position.
    pub fn stmt(&self, id: InstrId) -> Option<&Stmt> {
        self.blocks.get(id.block)?.stmts.get(id.index)
    }

    /// All statements with their positions, in program order.
    pub fn stmts(&self) -> impl Iterator<Item=(InstrId, &Stmt)> + '_ {
        self.blocks.iter().flat_map(Block::indexed)
    }

    /// The value an operand refers to, if it is a value with a referrer set.
    pub fn resolve(&self, operand: &Operand) -> Option<ValueId> {
        match operand {
            Operand::Temp(t) => self.temps.get(t).map(|&id| ValueId::Instr(id)),
            Operand::Name(x) => self.signature.params.iter()
                .position(|p| &p.name == x)
                .map(ValueId::Param),
            Operand::Const(_) => None,
        }
    }

    /// The value defined by the instruction at `id`, if it defines one.
    pub fn value_at(&self, id: InstrId) -> Option<ValueId> {
        self.stmt(id)?.result.map(|_| ValueId::Instr(id))
    }

    /// Instructions using the given value, in program order.
    ///
    /// Returns `None` for values which have no referrer set at all (i.e. unknown to this
    /// function), and an empty slice for values which are never used.
    pub fn referrers(&self, value: ValueId) -> Option<&[InstrId]> {
        self.referrers.get(&value).map(Vec::as_slice)
    }
}

impl ControlFlow for Function {
    fn block_count(&self) -> usize { self.blocks.len() }
    fn successor_blocks(&self, block_idx: usize) -> NextBlocks {
        self.blocks[block_idx].terminator().map_or(NextBlocks::Terminated, Instr::next_blocks)
    }
}

/// The linear SSA dump.
impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# Name: {}.{}", self.package, self.name)?;
        writeln!(f, "# Package: {}", self.package)?;
        write!(f, "func {}", self.name)?;
        self.signature.fmt_tail(f)?;
        if self.is_external() { return writeln!(f); }
        writeln!(f, ":")?;
        for block in &self.blocks {
            let label = format!("{}:", block.index);
            let message = format!("{} P:{} S:{}", block.comment,
                                  self.predecessor_blocks(block.index).len(),
                                  self.successor_blocks(block.index).into_iter().count());
            let padding = PUNCHCARD
                .saturating_sub(label.chars().count() + message.chars().count())
                .max(1);
            writeln!(f, "{}{:padding$}{}", label, "", message, padding = padding)?;
            for stmt in &block.stmts {
                writeln!(f, "\t{}", stmt)?;
            }
        }
        Ok(())
    }
}
