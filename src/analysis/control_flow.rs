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

//! Control flow between basic blocks.

use std::collections::BTreeSet;
use smallvec::{SmallVec, smallvec};
use crate::ir::Instr;
use crate::ir::instr::{If, Jump};

/// Successor blocks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NextBlocks {
    /// Control flow terminates here: block ends with a `return` or a `panic`.
    Terminated,
    /// Control flow is continuous: block ends with an unconditional `jump`.
    Continuous(usize),
    /// Control flow branches here: block ends with an `if`.
    Branching {
        /// If the condition is satisfied, the control flow branches to this block.
        if_true: usize,
        /// Otherwise, the control flow goes on with this block.
        if_false: usize,
    },
}

impl IntoIterator for NextBlocks {
    type Item = usize;
    type IntoIter = smallvec::IntoIter<[usize; 2]>;
    fn into_iter(self) -> Self::IntoIter {
        match self {
            NextBlocks::Terminated => SmallVec::new(),
            NextBlocks::Continuous(m) => smallvec![m],
            NextBlocks::Branching { if_true: m, if_false: n } => smallvec![m, n],
        }.into_iter()
    }
}

impl Instr {
    /// Successor blocks, if this instruction ends its block.
    pub fn next_blocks(&self) -> NextBlocks {
        match self {
            Instr::If(If { if_true, if_false, .. }) =>
                NextBlocks::Branching { if_true: *if_true, if_false: *if_false },
            Instr::Jump(Jump(dest)) => NextBlocks::Continuous(*dest),
            _ => NextBlocks::Terminated,
        }
    }
}

/// A control flow: a series of basic blocks indexed `0..block_count()`, with a successor relation
/// given by `successor_blocks`. Some helper functions are also provided here.
pub trait ControlFlow {
    /// Get the total number of basic blocks in this control flow.
    fn block_count(&self) -> usize;
    /// Which blocks are following this one (in the control flow graph)?
    fn successor_blocks(&self, block_idx: usize) -> NextBlocks;
    /// Which blocks lead to this one? A block branching here twice is listed twice.
    fn predecessor_blocks(&self, block_idx: usize) -> Vec<usize> {
        (0..self.block_count())
            .flat_map(|k| self.successor_blocks(k).into_iter()
                .filter(move |&n| n == block_idx)
                .map(move |_| k))
            .collect()
    }
    /// Collect all the blocks reachable from the given block into an existing set.
    fn collect_reachable_into(&self, block_idx: usize, result: &mut BTreeSet<usize>) {
        let mut pending = vec![block_idx];
        while let Some(k) = pending.pop() {
            if k < self.block_count() && result.insert(k) {
                pending.extend(self.successor_blocks(k));
            }
        }
    }
    /// Calculate all the blocks reachable from the given block.
    fn collect_reachable(&self, block_idx: usize) -> Vec<usize> {
        let mut result = BTreeSet::new();
        self.collect_reachable_into(block_idx, &mut result);
        result.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;
    use itertools::assert_equal;
    use super::{ControlFlow, NextBlocks};
    use crate::samples;
    use crate::ir::read_program;

    #[test]
    fn test_successors_and_predecessors() {
        let program = read_program(samples::MAP_OPERATIONS).unwrap();
        let init = program.find_function("init").unwrap();
        assert_eq!(init.successor_blocks(0), NextBlocks::Branching { if_true: 2, if_false: 1 });
        assert_eq!(init.successor_blocks(1), NextBlocks::Continuous(2));
        assert_eq!(init.successor_blocks(2), NextBlocks::Terminated);
        assert_equal(init.predecessor_blocks(2), [0usize, 1]);
        assert!(init.predecessor_blocks(0).is_empty());
        assert_equal(init.collect_reachable(1), [1usize, 2]);
    }

    #[test]
    fn test_long_chain() {
        const CHAIN: usize = 100_000;
        let mut text = String::from("package chain\n\nfunc f():\n");
        for k in 0..CHAIN - 1 {
            writeln!(text, "{}:\n\tjump {}", k, k + 1).unwrap();
        }
        writeln!(text, "{}:\n\treturn", CHAIN - 1).unwrap();
        let program = read_program(&text).unwrap();
        let func = program.find_function("f").unwrap();
        assert_eq!(func.block_count(), CHAIN);
        assert_eq!(func.collect_reachable(0).len(), CHAIN);
        assert_equal(func.collect_reachable(CHAIN - 2), [CHAIN - 2, CHAIN - 1]);
    }

    #[test]
    fn test_loop_reachability() {
        let program = read_program(samples::LOOP).unwrap();
        let describe = program.find_function("describe").unwrap();
        assert_equal(describe.predecessor_blocks(1), [0usize, 2]);
        assert_eq!(describe.collect_reachable(0).len(), describe.block_count());
    }
}
