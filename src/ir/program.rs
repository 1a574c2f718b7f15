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

//! Programs, and the reader for SSA listings.
//!
//! A listing declares one package, followed by its members:
//!
//! ```text
//! package demo
//!
//! var counter int
//!
//! func setToMap(m map[string]int, key string, value int):
//! 0:                                                                entry P:0 S:0
//! 	m[key] = value
//! 	return
//! ```
//!
//! Lines starting with `#` are comments. Block labels are `N:` followed by an optional comment;
//! the `P:x S:y` counts written by the [`Function`] dump are recomputed and thus ignored.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::path::Path;
use displaydoc::Display as DisplayDoc;
use parse_display::{Display, FromStr};
use thiserror::Error;
use tracing::debug;

use crate::ir::syntax::{is_identifier, matching_close, split_list};
use super::{Block, Stmt};
use super::function::{self, Function, Param, Signature};

/// Package-level variable.
#[derive(Debug, Display, FromStr, Clone, Eq, PartialEq)]
#[display("var {name} {ty}")]
#[allow(missing_docs)]
pub struct Global {
    pub name: String,
    pub ty: String,
}

/// Package member.
#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Member {
    Function(Function),
    Global(Global),
}

impl Member {
    /// Name of this member, unique in its package.
    pub fn name(&self) -> &str {
        match self {
            Member::Function(func) => &func.name,
            Member::Global(global) => &global.name,
        }
    }
}

impl Display for Member {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Member::Function(func) => write!(f, "{}", func),
            Member::Global(global) => writeln!(f, "{}", global),
        }
    }
}

/// A validated program: one package and its members, in declaration order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Program {
    /// Name of the package.
    pub package: String,
    /// All members of the package.
    pub members: Vec<Member>,
}

impl Program {
    /// All functions of this program, in declaration order.
    pub fn functions(&self) -> impl Iterator<Item=&Function> + '_ {
        self.members.iter().filter_map(|member| match member {
            Member::Function(func) => Some(func),
            Member::Global(_) => None,
        })
    }

    /// Find a function by its exact name.
    pub fn find_function(&self, name: &str) -> Option<&Function> {
        self.functions().find(|func| func.name == name)
    }

    /// Number of members, functions and globals alike.
    pub fn member_count(&self) -> usize { self.members.len() }
}

/// The listing, which reads back to an equal program.
impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "package {}", self.package)?;
        for member in &self.members {
            writeln!(f)?;
            write!(f, "{}", member)?;
        }
        Ok(())
    }
}

/// Syntax errors in a listing.
#[derive(Debug, DisplayDoc, Error)]
#[allow(missing_docs)]
pub enum ParseError {
    /// line {0}: expected `package NAME` before any member
    MissingPackage(usize),
    /// line {0}: package is already declared
    DuplicatePackage(usize),
    /// line {line}: malformed function header `{text}`
    InvalidHeader { line: usize, text: String },
    /// line {line}: malformed global `{text}`
    InvalidGlobal { line: usize, text: String },
    /// line {line}: `{text}` appears outside of any function
    UnexpectedLine { line: usize, text: String },
    /// line {line}: instruction `{text}` appears before the first block label
    InstrOutsideBlock { line: usize, text: String },
    /// line {line}: invalid instruction `{text}`: {source}
    InvalidInstr { line: usize, text: String, source: parse_display::ParseError },
}

/// Failure to obtain a valid program.
#[derive(Debug, DisplayDoc, Error)]
pub enum Error {
    /// 解析文件失败: {0}
    Io(#[from] std::io::Error),
    /// 解析文件失败: {0}
    Parse(#[from] ParseError),
    /// 类型检查失败: {0}
    Invalid(#[from] function::Error),
    /// 类型检查失败: {0} redeclared in this block
    DuplicateMember(String),
}

struct PendingFunction {
    name: String,
    signature: Signature,
    blocks: Vec<Block>,
}

enum Pending {
    Function(PendingFunction),
    Global(Global),
}

impl Pending {
    fn name(&self) -> &str {
        match self {
            Pending::Function(func) => &func.name,
            Pending::Global(global) => &global.name,
        }
    }
}

/// Read a listing from a file, see [`read_program`].
pub fn load_program(path: impl AsRef<Path>) -> Result<Program, Error> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading program");
    let text = std::fs::read_to_string(path)?;
    read_program(&text)
}

/// Read a listing, validate every function, and index its values.
pub fn read_program(text: &str) -> Result<Program, Error> {
    let (package, pending) = parse_listing(text)?;
    let mut names = BTreeSet::new();
    for item in &pending {
        if !names.insert(item.name().to_string()) {
            return Err(Error::DuplicateMember(item.name().to_string()));
        }
    }
    let members = pending.into_iter()
        .map(|item| Ok(match item {
            Pending::Global(global) => Member::Global(global),
            Pending::Function(PendingFunction { name, signature, blocks }) => Member::Function(
                Function::new(name, package.clone(), signature, blocks, &names)?),
        }))
        .collect::<Result<Vec<_>, Error>>()?;
    debug!(package = %package, members = members.len(), "program loaded");
    Ok(Program { package, members })
}

fn parse_listing(text: &str) -> Result<(String, Vec<Pending>), ParseError> {
    let mut package = None;
    let mut items = Vec::new();
    for (k, line) in text.lines().enumerate() {
        let line_no = k + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if let Some(name) = line.strip_prefix("package ") {
            if package.is_some() { return Err(ParseError::DuplicatePackage(line_no)); }
            package = Some(name.trim().to_string());
            continue;
        }
        if package.is_none() { return Err(ParseError::MissingPackage(line_no)); }
        if line.starts_with("var ") {
            let global = line.parse()
                .map_err(|_| ParseError::InvalidGlobal { line: line_no, text: line.to_string() })?;
            items.push(Pending::Global(global));
        } else if let Some(header) = line.strip_prefix("func ") {
            let func = parse_header(header)
                .ok_or_else(|| ParseError::InvalidHeader { line: line_no, text: line.to_string() })?;
            items.push(Pending::Function(func));
        } else {
            let func = match items.last_mut() {
                Some(Pending::Function(func)) => func,
                _ => return Err(ParseError::UnexpectedLine { line: line_no, text: line.to_string() }),
            };
            if let Some((index, comment)) = parse_label(line) {
                func.blocks.push(Block { index, comment: comment.to_string(), stmts: Vec::new() });
                continue;
            }
            let block = func.blocks.last_mut()
                .ok_or_else(|| ParseError::InstrOutsideBlock { line: line_no, text: line.to_string() })?;
            let stmt: Stmt = line.parse().map_err(|source| ParseError::InvalidInstr {
                line: line_no,
                text: line.to_string(),
                source,
            })?;
            block.stmts.push(stmt);
        }
    }
    let package = package.ok_or_else(|| ParseError::MissingPackage(text.lines().count()))?;
    Ok((package, items))
}

/// `name(params) results`, optionally followed by a colon.
fn parse_header(header: &str) -> Option<PendingFunction> {
    let header = header.trim_end();
    let header = header.strip_suffix(':').unwrap_or(header);
    let open = header.find('(')?;
    let name = header[..open].trim();
    if !is_identifier(name) { return None; }
    let close = matching_close(header, open)?;
    let params = split_list(&header[open + 1..close]).into_iter()
        .map(str::parse)
        .collect::<Result<Vec<Param>, _>>()
        .ok()?;
    let results = header[close + 1..].trim().to_string();
    Some(PendingFunction {
        name: name.to_string(),
        signature: Signature { params, results },
        blocks: Vec::new(),
    })
}

/// `N:`, then an optional comment.
fn parse_label(line: &str) -> Option<(usize, &str)> {
    let (index, rest) = line.split_once(':')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) { return None; }
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) { return None; }
    Some((index.parse().ok()?, strip_counts(rest.trim())))
}

/// Drop the trailing `P:x S:y` from a block comment.
fn strip_counts(comment: &str) -> &str {
    let is_count = |word: &str, prefix: &str| word.strip_prefix(prefix)
        .map_or(false, |n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
    match comment.rsplitn(3, ' ').collect::<Vec<_>>()[..] {
        [s, p, rest] if is_count(s, "S:") && is_count(p, "P:") => rest.trim_end(),
        [s, p] if is_count(s, "S:") && is_count(p, "P:") => "",
        _ => comment,
    }
}
