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

//! Human-readable annotations for instructions.

use itertools::Itertools;
use crate::ir::Instr;
use crate::ir::instr::{BinOp, Call, Callee, Extract, If, Lookup, MakeMap, MapUpdate, Return};

/// Describe an instruction in words.
///
/// Map operations, tuple extraction, branches, calls, binary operations and returns are explained;
/// for every other kind the description is exactly the instruction text. Only the structure is
/// described, operands are never evaluated.
pub fn describe(instr: &Instr) -> String {
    match instr {
        Instr::MakeMap(MakeMap { ty }) => format!("创建map，类型={}", ty),
        Instr::MapUpdate(MapUpdate { key, value, .. }) => format!("更新map[{}] = {}", key, value),
        Instr::Lookup(Lookup { index, .. }) => format!("从map查找，key={}，返回(value, ok)", index),
        Instr::Extract(Extract { index, .. }) => format!("提取元组第{}个元素", index),
        Instr::If(If { cond, .. }) => format!("条件分支，条件={}", cond),
        Instr::Call(Call { callee: Callee::Invoke { method, .. }, .. }) =>
            format!("接口方法调用 {}", method),
        Instr::Call(Call { callee: Callee::Direct(func), .. }) => format!("函数调用 {}", func),
        Instr::BinOp(BinOp { x, op, y }) => format!("二元运算 {} {} {}", x, op, y),
        Instr::Return(Return { results }) if results.is_empty() => "无返回值".to_string(),
        Instr::Return(Return { results }) => format!("返回值 [{}]", results.iter().format(" ")),
        _ => instr.to_string(),
    }
}
