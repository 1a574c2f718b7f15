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

//! Instructions of the SSA form.
//!
//! Every instruction kind is a variant of [`Instr`], carrying a payload type that knows how to
//! print itself in listing syntax and parse itself back. [`Instr::kind`] gives the kind tag.

pub mod operand;
pub mod call;

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use itertools::Itertools;
use parse_display::{Display, FromStr, ParseError};
use smallvec::{SmallVec, smallvec};

use crate::ir::syntax::{find_top_level, split_list, split_top_level};
pub use operand::{Const, Operand, Temp};
pub use call::{Call, Callee};

/// Kind tags, one per variant of [`Instr`].
#[derive(Debug, Display, FromStr, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[allow(missing_docs)]
pub enum Kind {
    MakeMap,
    MapUpdate,
    Lookup,
    Extract,
    If,
    Jump,
    Call,
    BinOp,
    UnOp,
    Return,
    MakeInterface,
    Alloc,
    Store,
    Phi,
    Convert,
    Panic,
}

/// Binary operators.
#[derive(Debug, Display, FromStr, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum BinaryOp {
    #[display("+")]
    Add,
    #[display("-")]
    Sub,
    #[display("*")]
    Mul,
    #[display("/")]
    Div,
    #[display("%")]
    Rem,
    #[display("&")]
    And,
    #[display("|")]
    Or,
    #[display("^")]
    Xor,
    #[display("<<")]
    Shl,
    #[display(">>")]
    Shr,
    #[display("&^")]
    AndNot,
    #[display("==")]
    Eql,
    #[display("!=")]
    Neq,
    #[display("<")]
    Lss,
    #[display("<=")]
    Leq,
    #[display(">")]
    Gtr,
    #[display(">=")]
    Geq,
}

/// Unary operators.
#[derive(Debug, Display, FromStr, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub enum UnaryOp {
    /// Channel receive.
    #[display("<-")]
    Recv,
    /// Pointer dereference.
    #[display("*")]
    Deref,
    /// Arithmetic negation.
    #[display("-")]
    Neg,
    /// Logical negation.
    #[display("!")]
    Not,
    /// Bitwise complement.
    #[display("^")]
    Complement,
}

impl UnaryOp {
    const ALL: [UnaryOp; 5] = [
        UnaryOp::Recv, UnaryOp::Deref, UnaryOp::Neg, UnaryOp::Not, UnaryOp::Complement,
    ];
}

/// Allocation sites.
#[derive(Debug, Display, FromStr, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub enum Place {
    /// Stack allocation (`local`).
    #[display("local")]
    Stack,
    /// Heap allocation (`new`).
    #[display("new")]
    Heap,
}

/// Create a new map.
#[derive(Debug, Display, Clone, Eq, PartialEq)]
#[display("make {ty}")]
pub struct MakeMap {
    /// Type of the map, e.g. `map[string]int`.
    pub ty: String,
}

impl FromStr for MakeMap {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("make ")
            .filter(|ty| ty.starts_with("map[") && split_top_level(ty, ' ').len() == 1)
            .map(|ty| MakeMap { ty: ty.to_string() })
            .ok_or_else(|| ParseError::with_message("expected `make map[K]V`"))
    }
}

/// Store `value` at `key` in `map`.
#[derive(Debug, Display, FromStr, Clone, Eq, PartialEq)]
#[display("{map}[{key}] = {value}")]
#[allow(missing_docs)]
pub struct MapUpdate {
    pub map: Operand,
    pub key: Operand,
    pub value: Operand,
}

/// Index into a map (or a string), optionally in comma-ok form returning `(value, ok)`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Lookup {
    /// The map being indexed.
    pub x: Operand,
    /// The key.
    pub index: Operand,
    /// Whether the `(value, ok)` tuple is produced, written `x[i],ok`.
    pub comma_ok: bool,
}

impl Display for Lookup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.x, self.index)?;
        if self.comma_ok { write!(f, ",ok")?; }
        Ok(())
    }
}

impl FromStr for Lookup {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (s, comma_ok) = match s.strip_suffix(",ok") {
            Some(s) => (s, true),
            None => (s, false),
        };
        let (x, index) = s.strip_suffix(']')
            .and_then(|s| s.split_once('['))
            .ok_or_else(|| ParseError::with_message("expected `x[index]`"))?;
        Ok(Lookup { x: x.parse()?, index: index.parse()?, comma_ok })
    }
}

/// Extract one element from a tuple.
#[derive(Debug, Display, FromStr, Clone, Eq, PartialEq)]
#[display("extract {tuple} #{index}")]
#[allow(missing_docs)]
pub struct Extract {
    pub tuple: Operand,
    pub index: usize,
}

/// Conditional branch.
#[derive(Debug, Display, FromStr, Clone, Eq, PartialEq)]
#[display("if {cond} goto {if_true} else {if_false}")]
#[allow(missing_docs)]
pub struct If {
    pub cond: Operand,
    pub if_true: usize,
    pub if_false: usize,
}

/// Unconditional branch.
#[derive(Debug, Display, FromStr, Copy, Clone, Eq, PartialEq)]
#[display("jump {0}")]
pub struct Jump(pub usize);

/// Binary operation.
#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub struct BinOp {
    pub x: Operand,
    pub op: BinaryOp,
    pub y: Operand,
}

impl Display for BinOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.x, self.op, self.y)
    }
}

impl FromStr for BinOp {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_top_level(s, ' ').as_slice() {
            [x, op, y] => Ok(BinOp { x: x.parse()?, op: op.parse()?, y: y.parse()? }),
            _ => Err(ParseError::with_message("expected `x op y`")),
        }
    }
}

/// Unary operation.
#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub struct UnOp {
    pub op: UnaryOp,
    pub x: Operand,
}

impl Display for UnOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.op, self.x)
    }
}

impl FromStr for UnOp {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnaryOp::ALL.iter()
            .find_map(|&op| s.strip_prefix(&op.to_string()).map(|x| (op, x)))
            .ok_or_else(|| ParseError::with_message("expected a unary operator"))
            .and_then(|(op, x)| Ok(UnOp { op, x: x.parse()? }))
    }
}

/// Return from the function, with zero or more results.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Return {
    /// The returned values.
    pub results: Vec<Operand>,
}

impl Display for Return {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "return")?;
        if !self.results.is_empty() {
            write!(f, " {}", self.results.iter().format(", "))?;
        }
        Ok(())
    }
}

impl FromStr for Return {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let results = match s.strip_prefix("return") {
            Some("") => Vec::new(),
            Some(rest) if rest.starts_with(' ') => split_list(rest)
                .into_iter().map(str::parse).collect::<Result<_, _>>()?,
            _ => return Err(ParseError::with_message("expected `return`")),
        };
        Ok(Return { results })
    }
}

/// Box a concrete value into an interface value.
#[derive(Debug, Display, FromStr, Clone, Eq, PartialEq)]
#[display("make {ty} <- {from} ({x})")]
pub struct MakeInterface {
    /// The interface type.
    pub ty: String,
    /// The concrete type of `x`.
    pub from: String,
    /// The boxed value.
    pub x: Operand,
}

/// Allocate a variable, on the stack or on the heap.
#[derive(Debug, Display, FromStr, Clone, Eq, PartialEq)]
#[display("{place} {ty} ({comment})")]
#[allow(missing_docs)]
pub struct Alloc {
    pub place: Place,
    pub ty: String,
    /// Usually the name of the source variable.
    pub comment: String,
}

/// Store through a pointer.
#[derive(Debug, Display, FromStr, Clone, Eq, PartialEq)]
#[display("*{addr} = {value}")]
#[allow(missing_docs)]
pub struct Store {
    pub addr: Operand,
    pub value: Operand,
}

/// φ-node: one incoming value per predecessor block.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Phi {
    /// `(block, value)` pairs.
    pub edges: Vec<(usize, Operand)>,
    /// Usually the name of the source variable, written after `#`.
    pub comment: String,
}

impl Display for Phi {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let edges = self.edges.iter().format_with(", ", |(k, v), f| f(&format_args!("{}: {}", k, v)));
        write!(f, "phi [{}]", edges)?;
        if !self.comment.is_empty() { write!(f, " #{}", self.comment)?; }
        Ok(())
    }
}

impl FromStr for Phi {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::with_message("expected `phi [k: v, ...] #comment`");
        let s = s.strip_prefix("phi [").ok_or_else(invalid)?;
        let (edges, comment) = match s.rsplit_once("] #") {
            Some((edges, comment)) => (edges, comment),
            None => (s.strip_suffix(']').ok_or_else(invalid)?, ""),
        };
        let edges = split_list(edges).into_iter()
            .map(|edge| -> Result<(usize, Operand), ParseError> {
                let (k, v) = edge.split_once(": ").ok_or_else(invalid)?;
                Ok((k.parse().map_err(|_| invalid())?, v.parse()?))
            })
            .collect::<Result<_, ParseError>>()?;
        Ok(Phi { edges, comment: comment.to_string() })
    }
}

/// Type conversion.
#[derive(Debug, Display, FromStr, Clone, Eq, PartialEq)]
#[display("convert {ty} <- {from} ({x})")]
#[allow(missing_docs)]
pub struct Convert {
    pub ty: String,
    pub from: String,
    pub x: Operand,
}

/// Panic with the given (interface) value.
#[derive(Debug, Display, FromStr, Clone, Eq, PartialEq)]
#[display("panic {0}")]
pub struct Panic(pub Operand);

/// Whether an instruction defines a value, i.e. whether it is written `tN = ...`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Output {
    /// Always defines a value.
    Always,
    /// Calls define a value unless the callee returns nothing.
    Optional,
    /// Executed for its effect only.
    Never,
}

/// Instructions.
#[derive(Debug, Display, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Instr {
    #[display("{0}")]
    MakeMap(MakeMap),
    #[display("{0}")]
    MapUpdate(MapUpdate),
    #[display("{0}")]
    Lookup(Lookup),
    #[display("{0}")]
    Extract(Extract),
    #[display("{0}")]
    If(If),
    #[display("{0}")]
    Jump(Jump),
    #[display("{0}")]
    Call(Call),
    #[display("{0}")]
    BinOp(BinOp),
    #[display("{0}")]
    UnOp(UnOp),
    #[display("{0}")]
    Return(Return),
    #[display("{0}")]
    MakeInterface(MakeInterface),
    #[display("{0}")]
    Alloc(Alloc),
    #[display("{0}")]
    Store(Store),
    #[display("{0}")]
    Phi(Phi),
    #[display("{0}")]
    Convert(Convert),
    #[display("{0}")]
    Panic(Panic),
}

impl Instr {
    /// The kind tag of this instruction.
    pub fn kind(&self) -> Kind {
        match self {
            Instr::MakeMap(_) => Kind::MakeMap,
            Instr::MapUpdate(_) => Kind::MapUpdate,
            Instr::Lookup(_) => Kind::Lookup,
            Instr::Extract(_) => Kind::Extract,
            Instr::If(_) => Kind::If,
            Instr::Jump(_) => Kind::Jump,
            Instr::Call(_) => Kind::Call,
            Instr::BinOp(_) => Kind::BinOp,
            Instr::UnOp(_) => Kind::UnOp,
            Instr::Return(_) => Kind::Return,
            Instr::MakeInterface(_) => Kind::MakeInterface,
            Instr::Alloc(_) => Kind::Alloc,
            Instr::Store(_) => Kind::Store,
            Instr::Phi(_) => Kind::Phi,
            Instr::Convert(_) => Kind::Convert,
            Instr::Panic(_) => Kind::Panic,
        }
    }

    /// All the operands, in the order they are written.
    pub fn get_operands(&self) -> SmallVec<[&Operand; 3]> {
        match self {
            Instr::MapUpdate(MapUpdate { map, key, value }) => smallvec![map, key, value],
            Instr::Lookup(Lookup { x, index, .. }) => smallvec![x, index],
            Instr::Extract(Extract { tuple, .. }) => smallvec![tuple],
            Instr::If(If { cond, .. }) => smallvec![cond],
            Instr::Call(call) => {
                let callee = match &call.callee {
                    Callee::Direct(func) => func,
                    Callee::Invoke { receiver, .. } => receiver,
                };
                std::iter::once(callee).chain(&call.args).collect()
            }
            Instr::BinOp(BinOp { x, y, .. }) => smallvec![x, y],
            Instr::UnOp(UnOp { x, .. }) => smallvec![x],
            Instr::Return(ret) => ret.results.iter().collect(),
            Instr::MakeInterface(MakeInterface { x, .. }) => smallvec![x],
            Instr::Store(Store { addr, value }) => smallvec![addr, value],
            Instr::Phi(phi) => phi.edges.iter().map(|(_, v)| v).collect(),
            Instr::Convert(Convert { x, .. }) => smallvec![x],
            Instr::Panic(Panic(x)) => smallvec![x],
            Instr::MakeMap(_) | Instr::Jump(_) | Instr::Alloc(_) => SmallVec::new(),
        }
    }

    /// Whether this instruction defines a value.
    pub fn output(&self) -> Output {
        match self {
            Instr::MakeMap(_) | Instr::Lookup(_) | Instr::Extract(_)
            | Instr::BinOp(_) | Instr::UnOp(_) | Instr::MakeInterface(_)
            | Instr::Alloc(_) | Instr::Phi(_) | Instr::Convert(_) => Output::Always,
            Instr::Call(_) => Output::Optional,
            Instr::MapUpdate(_) | Instr::If(_) | Instr::Jump(_)
            | Instr::Return(_) | Instr::Store(_) | Instr::Panic(_) => Output::Never,
        }
    }

    /// Control transfer instructions end a basic block, and only appear there.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Instr::If(_) | Instr::Jump(_) | Instr::Return(_) | Instr::Panic(_))
    }

    /// Blocks this instruction refers to: branch targets and φ-node predecessors.
    pub fn block_refs(&self) -> SmallVec<[usize; 2]> {
        match self {
            Instr::If(If { if_true, if_false, .. }) => smallvec![*if_true, *if_false],
            Instr::Jump(Jump(dest)) => smallvec![*dest],
            Instr::Phi(phi) => phi.edges.iter().map(|(k, _)| *k).collect(),
            _ => SmallVec::new(),
        }
    }
}

impl FromStr for Instr {
    type Err = ParseError;
    /// Dispatch on the leading keyword first, then on the shape of the text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keyword = s.split(' ').next().unwrap_or_default();
        let by_keyword = match keyword {
            "make" if s.contains(" <- ") => Some(s.parse().map(Instr::MakeInterface)),
            "make" => Some(s.parse().map(Instr::MakeMap)),
            "extract" => Some(s.parse().map(Instr::Extract)),
            "if" => Some(s.parse().map(Instr::If)),
            "jump" => Some(s.parse().map(Instr::Jump)),
            "return" => Some(s.parse().map(Instr::Return)),
            "invoke" => Some(s.parse().map(Instr::Call)),
            "local" | "new" => Some(s.parse().map(Instr::Alloc)),
            "phi" => Some(s.parse().map(Instr::Phi)),
            "convert" => Some(s.parse().map(Instr::Convert)),
            "panic" => Some(s.parse().map(Instr::Panic)),
            _ => None,
        };
        match by_keyword {
            Some(Ok(instr)) => Ok(instr),
            // a keyword may also be an ordinary name, e.g. a parameter called `local`
            Some(Err(err)) => Instr::from_shape(s).map_err(|_| err),
            None => Instr::from_shape(s),
        }
    }
}

impl Instr {
    fn from_shape(s: &str) -> Result<Self, ParseError> {
        if find_top_level(s, " = ").is_some() {
            match s.starts_with('*') {
                true => s.parse().map(Instr::Store),
                false => s.parse().map(Instr::MapUpdate),
            }
        } else if split_top_level(s, ' ').len() == 3 {
            s.parse().map(Instr::BinOp)
        } else if s.ends_with(')') {
            s.parse().map(Instr::Call)
        } else if s.ends_with(']') || s.ends_with(",ok") {
            s.parse().map(Instr::Lookup)
        } else {
            s.parse().map(Instr::UnOp)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BinaryOp, Instr, Kind, Lookup, Operand, Output, Phi, Temp};

    macro_rules! assert_kinds {
        ($($str: literal => $kind: expr),+ $(,)?) => {
            $(
                let instr: Instr = $str.parse().unwrap();
                assert_eq!(instr.kind(), $kind, "{}", $str);
                assert_eq!(instr.to_string(), $str);
            )+
        }
    }

    #[test]
    fn test_instruction_kinds() {
        assert_kinds! {
            "make map[string]int" => Kind::MakeMap,
            "make interface{} <- int (42:int)" => Kind::MakeInterface,
            r#"t0["value":string] = t1"# => Kind::MapUpdate,
            "m[key],ok" => Kind::Lookup,
            "extract t0 #1" => Kind::Extract,
            "if t2 goto 1 else 2" => Kind::If,
            "jump 2" => Kind::Jump,
            r#"setToMap(t0, "alice":string, 95:int)"# => Kind::Call,
            "invoke s.String()" => Kind::Call,
            "t1 < n" => Kind::BinOp,
            "*init$guard" => Kind::UnOp,
            "return -1:int" => Kind::Return,
            "return" => Kind::Return,
            "local [4]int (buf)" => Kind::Alloc,
            "*init$guard = true:bool" => Kind::Store,
            "phi [0: 0:int, 2: t3] #i" => Kind::Phi,
            "convert []byte <- string (t4)" => Kind::Convert,
            "panic t8" => Kind::Panic,
        }
    }

    #[test]
    fn test_payloads() {
        let Instr::Lookup(lookup) = r#"t0["charlie":string],ok"#.parse().unwrap() else { panic!() };
        assert_eq!(lookup, Lookup {
            x: Operand::Temp(Temp(0)),
            index: r#""charlie":string"#.parse().unwrap(),
            comma_ok: true,
        });
        let Instr::BinOp(binop) = r#""a b":string + t1"#.parse().unwrap() else { panic!() };
        assert_eq!(binop.op, BinaryOp::Add);
        let phi: Phi = "phi [0: t1, 1: t2]".parse().unwrap();
        assert_eq!(phi.edges.len(), 2);
        assert!(phi.comment.is_empty());
        assert_eq!(phi.to_string(), "phi [0: t1, 1: t2]");
    }

    #[test]
    fn test_operands_and_outputs() {
        let call: Instr = "f(t1, 2:int)".parse().unwrap();
        assert_eq!(call.get_operands().len(), 3);
        assert_eq!(call.output(), Output::Optional);
        let update: Instr = "m[key] = value".parse().unwrap();
        assert_eq!(update.output(), Output::Never);
        assert!(!update.is_terminator());
        let branch: Instr = "if t2 goto 1 else 2".parse().unwrap();
        assert!(branch.is_terminator());
        assert_eq!(branch.block_refs().as_slice(), &[1, 2]);
    }

    #[test]
    fn test_invalid_instruction() {
        for text in ["", "make", "extract t0", "if t2 goto x else 2", "t1 +", "return,", "frobnicate",
                     "make []int 3:int 3:int", "make chan int 0:int", "make map[string]int 4:int"] {
            assert!(text.parse::<Instr>().is_err(), "accepted {:?}", text);
        }
    }

    #[test]
    fn test_keywords_as_names() {
        let instr: Instr = "local + 1:int".parse().unwrap();
        assert_eq!(instr.kind(), Kind::BinOp);
        let instr: Instr = "extract(t0)".parse().unwrap();
        assert_eq!(instr.kind(), Kind::Call);
        let instr: Instr = "phi[key],ok".parse().unwrap();
        assert_eq!(instr.kind(), Kind::Lookup);
        let instr: Instr = "new[1:int] = jump".parse().unwrap();
        assert_eq!(instr.kind(), Kind::MapUpdate);
        let Instr::BinOp(binop) = "convert * 2:int".parse().unwrap() else { panic!() };
        assert_eq!(binop.x, Operand::Name("convert".to_string()));
        assert_eq!(binop.op, BinaryOp::Mul);
    }
}
