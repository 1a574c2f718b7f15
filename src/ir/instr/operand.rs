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

//! Operands: how instructions refer to values.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use parse_display::{Display, FromStr, ParseError};

use crate::ir::syntax::{is_identifier, string_literal_len};

/// Name of an instruction result, written `tN`.
#[derive(Debug, Display, FromStr, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[display("t{0}")]
pub struct Temp(pub usize);

/// A constant, written `literal:type`, e.g. `42:int` or `"value":string`.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Const {
    /// The literal, exactly as written (string literals keep their quotes).
    pub literal: String,
    /// The type of this constant.
    pub ty: String,
}

impl Display for Const {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.literal, self.ty)
    }
}

impl FromStr for Const {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = match string_literal_len(s) {
            Some(n) => s[n..].starts_with(':').then(|| n),
            None if s.starts_with('"') => None,
            None => s.find(':'),
        };
        let k = split.ok_or_else(|| ParseError::with_message("expected `literal:type`"))?;
        let (literal, ty) = (&s[..k], &s[k + 1..]);
        if literal.is_empty() || ty.is_empty() {
            return Err(ParseError::with_message("expected `literal:type`"));
        }
        Ok(Const { literal: literal.to_string(), ty: ty.to_string() })
    }
}

/// Operands to [`Instr`](crate::ir::Instr)uctions.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum Operand {
    /// Result of another instruction in the same function.
    Temp(Temp),
    /// Constant literal.
    Const(Const),
    /// A parameter, a package member (function or global), or a builtin.
    Name(String),
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Temp(t) => write!(f, "{}", t),
            Operand::Const(c) => write!(f, "{}", c),
            Operand::Name(x) => write!(f, "{}", x),
        }
    }
}

impl FromStr for Operand {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('"') || s.contains(':') {
            s.parse().map(Operand::Const)
        } else if let Ok(t) = s.parse() {
            Ok(Operand::Temp(t))
        } else if is_identifier(s) {
            Ok(Operand::Name(s.to_string()))
        } else {
            Err(ParseError::with_message("invalid operand"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Const, Operand, Temp};

    fn constant(literal: &str, ty: &str) -> Operand {
        Operand::Const(Const { literal: literal.to_string(), ty: ty.to_string() })
    }

    #[test]
    fn test_operand() {
        assert_eq!("t12".parse::<Operand>().unwrap(), Operand::Temp(Temp(12)));
        assert_eq!("text".parse::<Operand>().unwrap(), Operand::Name("text".to_string()));
        assert_eq!("-1:int".parse::<Operand>().unwrap(), constant("-1", "int"));
        assert_eq!("nil:map[string]int".parse::<Operand>().unwrap(), constant("nil", "map[string]int"));
        assert_eq!(r#""Alice's score:":string"#.parse::<Operand>().unwrap(),
                   constant(r#""Alice's score:""#, "string"));
        assert_eq!(constant(r#""a:b""#, "string").to_string(), r#""a:b":string"#);
    }

    #[test]
    fn test_invalid_operand() {
        for text in ["", "42", r#""unterminated"#, r#""no type""#, ":int", "1:", "a b"] {
            assert!(text.parse::<Operand>().is_err(), "accepted {:?}", text);
        }
    }
}
