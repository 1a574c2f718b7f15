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

//! Classify every instruction of a function.

use tracing::debug;
use crate::ir::{Function, InstrId, Kind, Program, Stmt};
use super::classify::describe;

/// An instruction together with its position, kind tag, and description.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InstructionInfo<'a> {
    /// Position of the instruction in its function.
    pub id: InstrId,
    /// Kind tag of the instruction.
    pub kind: Kind,
    /// The statement containing the instruction.
    pub stmt: &'a Stmt,
    /// Annotation from [`describe`].
    pub description: String,
}

impl<'a> InstructionInfo<'a> {
    /// Classify the statement at the given position.
    pub fn new(id: InstrId, stmt: &'a Stmt) -> Self {
        InstructionInfo { id, kind: stmt.instr.kind(), stmt, description: describe(&stmt.instr) }
    }

    /// Position of the instruction within its block.
    pub fn index(&self) -> usize { self.id.index }

    /// Textual form of the instruction, without the name of the value it defines.
    pub fn text(&self) -> String { self.stmt.instr.to_string() }

    /// Whether the description says more than the instruction text.
    pub fn is_annotated(&self) -> bool { self.description != self.text() }
}

/// Classify all instructions of a function, one vector per block, in order.
pub fn analyze(func: &Function) -> Vec<Vec<InstructionInfo<'_>>> {
    debug!(function = %func.name, "classifying instructions");
    func.blocks.iter()
        .map(|block| block.indexed().map(|(id, stmt)| InstructionInfo::new(id, stmt)).collect())
        .collect()
}

/// All instructions of the given kind, in program order.
pub fn find_by_kind(func: &Function, kind: Kind) -> Vec<InstructionInfo<'_>> {
    analyze(func).into_iter()
        .flatten()
        .filter(|info| info.kind == kind)
        .collect()
}

/// Find a function by its exact name.
pub fn find_function<'p>(program: &'p Program, name: &str) -> Option<&'p Function> {
    program.find_function(name)
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;
    use itertools::assert_equal;
    use super::{analyze, find_by_kind, find_function};
    use crate::samples;
    use crate::ir::{InstrId, Kind, read_program};

    #[test]
    fn test_analyze_preserves_layout() {
        for sample in samples::ALL_SAMPLES {
            let program = read_program(sample).unwrap();
            for func in program.functions() {
                let blocks = analyze(func);
                assert_eq!(blocks.len(), func.blocks.len());
                assert_eq!(blocks.iter().map(Vec::len).sum::<usize>(), func.instr_count());
                for (k, infos) in blocks.iter().enumerate() {
                    for (j, info) in infos.iter().enumerate() {
                        assert_eq!(info.id, InstrId { block: k, index: j });
                        assert_eq!(info.index(), j);
                        assert_eq!(info.kind, info.stmt.instr.kind());
                    }
                }
            }
        }
    }

    #[test]
    fn test_get_from_map() {
        let program = read_program(samples::MAP_OPERATIONS).unwrap();
        let func = find_function(&program, "getFromMap").unwrap();
        let blocks = analyze(func);
        assert_equal(blocks.iter().map(Vec::len), [4usize, 1, 1]);
        assert_equal(blocks[0].iter().map(|info| info.kind),
                     [Kind::Lookup, Kind::Extract, Kind::Extract, Kind::If]);
        let lookup = &blocks[0][0];
        assert_eq!(lookup.text(), "m[key],ok");
        assert_eq!(lookup.description, "从map查找，key=key，返回(value, ok)");
        assert!(lookup.is_annotated());
        assert_eq!(blocks[2][0].description, "返回值 [-1:int]");
    }

    #[test]
    fn test_find_by_kind() {
        let program = read_program(samples::MAP_OPERATIONS).unwrap();
        let main = find_function(&program, "main").unwrap();
        let make_maps = find_by_kind(main, Kind::MakeMap);
        assert_eq!(make_maps.len(), 1);
        assert_eq!(make_maps[0].id, InstrId { block: 0, index: 0 });
        assert_eq!(make_maps, find_by_kind(main, Kind::MakeMap));
        assert_eq!(find_by_kind(main, Kind::Call).len(), 6);
        assert!(find_by_kind(main, Kind::Phi).is_empty());

        let init = find_function(&program, "init").unwrap();
        assert_equal(find_by_kind(init, Kind::Store).iter().map(|info| info.id),
                     [InstrId { block: 1, index: 0 }]);
        assert!(find_function(&program, "init$guard").is_none());
    }

    #[test]
    fn test_large_block() {
        let mut text = String::from("package big\n\nfunc f():\n0:\n");
        for k in 0..1200 {
            writeln!(text, "\tprintln({}:int)", k).unwrap();
        }
        text.push_str("\tjump 1\n1:\n\tt0 = make map[string]int\n\treturn\n");
        let program = read_program(&text).unwrap();
        let func = find_function(&program, "f").unwrap();
        let calls = find_by_kind(func, Kind::Call);
        assert_eq!(calls.len(), 1200);
        assert_eq!(calls[1100].id, InstrId { block: 0, index: 1100 });
        assert_equal(find_by_kind(func, Kind::MakeMap).iter().map(|info| info.id),
                     [InstrId { block: 1, index: 0 }]);
    }
}
