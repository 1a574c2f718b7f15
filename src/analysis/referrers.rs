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

//! Consumers of a value.

use tracing::debug;
use crate::ir::{Function, InstrId, ValueId};
use super::function::InstructionInfo;

/// A consuming instruction, classified the same way as in [`analyze`](super::analyze).
pub type ReferrerInfo<'a> = InstructionInfo<'a>;

/// All instructions using the given value, in program order.
///
/// A value without a referrer set (e.g. a constant, or a value unknown to this function) has no
/// referrers at all.
pub fn referrers_of(func: &Function, value: ValueId) -> Vec<ReferrerInfo<'_>> {
    let referrers = func.referrers(value).unwrap_or_default();
    debug!(function = %func.name, %value, count = referrers.len(), "collecting referrers");
    referrers.iter()
        .filter_map(|&id| func.stmt(id).map(|stmt| InstructionInfo::new(id, stmt)))
        .collect()
}

/// All instructions using the value defined at the given position.
pub fn referrers_of_instr(func: &Function, id: InstrId) -> Vec<ReferrerInfo<'_>> {
    match func.value_at(id) {
        Some(value) => referrers_of(func, value),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use itertools::assert_equal;
    use super::{referrers_of, referrers_of_instr};
    use crate::samples;
    use crate::analysis::find_by_kind;
    use crate::ir::{Instr, InstrId, Kind, ValueId, read_program};

    #[test]
    fn test_register_map() {
        let program = read_program(samples::TINYGO_PATTERN).unwrap();
        let func = program.find_function("demonstrateTinyGoPattern").unwrap();
        let make_map = &find_by_kind(func, Kind::MakeMap)[0];
        let referrers = referrers_of_instr(func, make_map.id);
        assert_equal(referrers.iter().map(|info| info.kind),
                     [Kind::MapUpdate, Kind::MapUpdate, Kind::MapUpdate, Kind::Call]);
        let keys = referrers.iter().filter_map(|info| match &info.stmt.instr {
            Instr::MapUpdate(update) => Some(update.key.to_string()),
            _ => None,
        });
        assert_equal(keys, [r#""value":string"#, r#""result":string"#, r#""temp":string"#]);
        assert_eq!(referrers[0].description, r#"更新map["value":string] = t1"#);
        assert_eq!(referrers[3].description, "函数调用 AsmFull");
        assert_eq!(referrers[3].id, InstrId { block: 0, index: 7 });
    }

    #[test]
    fn test_lookups() {
        let program = read_program(indoc! {r#"
            package demo

            func main():
            0:
            	t0 = make map[string]int
            	t0["alice":string] = 95:int
            	t1 = t0["alice":string],ok
            	t2 = t0["charlie":string],ok
            	return
        "#}).unwrap();
        let func = program.find_function("main").unwrap();
        let referrers = referrers_of(func, ValueId::Instr(InstrId { block: 0, index: 0 }));
        assert_equal(referrers.iter().map(|info| info.kind),
                     [Kind::MapUpdate, Kind::Lookup, Kind::Lookup]);
        assert_eq!(referrers[1].description, r#"从map查找，key="alice":string，返回(value, ok)"#);
        assert_eq!(referrers[2].description, r#"从map查找，key="charlie":string，返回(value, ok)"#);
    }

    #[test]
    fn test_unused_values() {
        let program = read_program(samples::LOOP).unwrap();
        let func = program.find_function("describe").unwrap();
        // the local `buf` is never used
        assert!(referrers_of_instr(func, InstrId { block: 0, index: 0 }).is_empty());
        // `jump 1` defines nothing
        assert!(referrers_of_instr(func, InstrId { block: 0, index: 1 }).is_empty());
        assert!(referrers_of(func, ValueId::Param(9)).is_empty());

        // t1 = phi: used by the comparison and the increment
        let phi = referrers_of_instr(func, InstrId { block: 1, index: 0 });
        assert_equal(phi.iter().map(|info| info.kind), [Kind::BinOp, Kind::BinOp]);
        // t3 = t1 + 1:int: used by the phi in the loop header
        let next = referrers_of_instr(func, InstrId { block: 2, index: 0 });
        assert_equal(next.iter().map(|info| info.id), [InstrId { block: 1, index: 0 }]);
        // parameter s: the interface method call
        let s = referrers_of(func, ValueId::Param(0));
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].description, "接口方法调用 String");
    }
}
