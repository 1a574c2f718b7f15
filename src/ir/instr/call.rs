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

//! Call instructions: direct calls, and dynamically dispatched interface method calls.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use itertools::Itertools;
use parse_display::ParseError;

use crate::ir::syntax::{is_identifier, split_list};
use super::Operand;

/// What is being called.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Callee {
    /// A function value: package member, builtin, parameter or closure.
    Direct(Operand),
    /// A method on the dynamic type of an interface value.
    Invoke {
        /// The interface value.
        receiver: Operand,
        /// Name of the method to invoke.
        method: String,
    },
}

/// A function or method call, `f(a, b)` or `invoke r.Method(a, b)`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Call {
    /// The callee.
    pub callee: Callee,
    /// Actual arguments (the receiver of an `invoke` excluded).
    pub args: Vec<Operand>,
}

impl Call {
    /// Whether this is an interface method call.
    pub fn is_invoke(&self) -> bool {
        matches!(self.callee, Callee::Invoke { .. })
    }
}

impl Display for Call {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.callee {
            Callee::Direct(func) => write!(f, "{}", func)?,
            Callee::Invoke { receiver, method } => write!(f, "invoke {}.{}", receiver, method)?,
        }
        write!(f, "({})", self.args.iter().format(", "))
    }
}

impl FromStr for Call {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, args) = s.strip_suffix(')')
            .and_then(|s| s.split_once('('))
            .ok_or_else(|| ParseError::with_message("expected `callee(args)`"))?;
        let callee = match head.strip_prefix("invoke ") {
            Some(head) => {
                let (receiver, method) = head.rsplit_once('.')
                    .filter(|(_, method)| is_identifier(method))
                    .ok_or_else(|| ParseError::with_message("expected `invoke x.Method(args)`"))?;
                Callee::Invoke { receiver: receiver.parse()?, method: method.to_string() }
            }
            None => Callee::Direct(head.parse()?),
        };
        let args = split_list(args).into_iter().map(str::parse).collect::<Result<_, _>>()?;
        Ok(Call { callee, args })
    }
}

#[cfg(test)]
mod tests {
    use super::{Call, Callee};
    use crate::ir::instr::{Operand, Temp};

    #[test]
    fn test_call() {
        let call: Call = r#"AsmFull("mov {value}, {result}":string, t0)"#.parse().unwrap();
        assert_eq!(call.callee, Callee::Direct(Operand::Name("AsmFull".to_string())));
        assert_eq!(call.args.len(), 2);
        assert_eq!(call.args[1], Operand::Temp(Temp(0)));
        assert!(!call.is_invoke());

        let call: Call = "invoke t3.String()".parse().unwrap();
        assert_eq!(call.callee, Callee::Invoke {
            receiver: Operand::Temp(Temp(3)),
            method: "String".to_string(),
        });
        assert!(call.args.is_empty());
        assert_eq!(call.to_string(), "invoke t3.String()");
    }

    #[test]
    fn test_invalid_call() {
        assert!("f(".parse::<Call>().is_err());
        assert!("invoke t3(1:int)".parse::<Call>().is_err());
        assert!("f(a b)".parse::<Call>().is_err());
    }
}
