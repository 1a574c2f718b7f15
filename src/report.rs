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

//! Text reports: function listings with annotations, referrer reports, and package summaries.

use std::fmt::Display;
use std::io::{self, Write};
use crate::analysis::{InstructionInfo, ReferrerInfo, analyze, find_by_kind, referrers_of_instr};
use crate::ir::{Function, Kind, Program};

/// Width of the rule between functions in the viewer report.
pub const FUNCTION_RULE_WIDTH: usize = 60;
/// Width of the rule between functions in the referrer report.
pub const REFERRER_RULE_WIDTH: usize = 50;

/// `  [position] Kind: text`
pub fn write_instruction(out: &mut impl Write, position: usize, info: &InstructionInfo<'_>) -> io::Result<()> {
    writeln!(out, "  [{}] {}: {}", position, info.kind, info.text())
}

/// Name, signature, SSA dump, and the annotated instructions of each block.
pub fn write_function(out: &mut impl Write, func: &Function) -> io::Result<()> {
    writeln!(out, "函数: {}", func.name)?;
    writeln!(out, "签名: {}", func.signature)?;
    writeln!(out, "SSA表示:")?;
    write!(out, "{}", func)?;
    writeln!(out)?;
    writeln!(out, "--- 指令类型分析 ---")?;
    for (k, infos) in analyze(func).iter().enumerate() {
        writeln!(out, "基本块 {}:", k)?;
        for info in infos {
            write_instruction(out, info.index(), info)?;
            if info.is_annotated() {
                writeln!(out, "      → {}: {}", info.kind, info.description)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// An instruction defining a value, followed by all the instructions using that value.
pub fn write_referrers(out: &mut impl Write, site: &InstructionInfo<'_>,
                       referrers: &[ReferrerInfo<'_>]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "找到 {}: {}", site.kind, site.text())?;
    writeln!(out, "引用者数量: {}", referrers.len())?;
    for (k, info) in referrers.iter().enumerate() {
        write_instruction(out, k, info)?;
        if info.is_annotated() {
            writeln!(out, "      → {}", info.description)?;
        }
    }
    Ok(())
}

/// Package name and member count.
pub fn write_summary(out: &mut impl Write, program: &Program) -> io::Result<()> {
    writeln!(out, "包名: {}", program.package)?;
    writeln!(out, "成员数量: {}", program.member_count())
}

/// Every function of a program, then the package summary.
pub fn write_viewer_report(out: &mut impl Write, source: impl Display, program: &Program) -> io::Result<()> {
    writeln!(out, "=== 分析文件: {} ===", source)?;
    writeln!(out)?;
    for func in program.functions() {
        write_function(out, func)?;
        writeln!(out)?;
        writeln!(out, "{}", "=".repeat(FUNCTION_RULE_WIDTH))?;
        writeln!(out)?;
    }
    write_summary(out, program)
}

/// For every function, the referrers of each map it creates.
pub fn write_referrer_report(out: &mut impl Write, source: impl Display, program: &Program) -> io::Result<()> {
    writeln!(out, "=== 分析 {} 的Referrers ===", source)?;
    writeln!(out)?;
    for func in program.functions() {
        writeln!(out, "分析函数: {}", func.name)?;
        for site in find_by_kind(func, Kind::MakeMap) {
            write_referrers(out, &site, &referrers_of_instr(func, site.id))?;
        }
        writeln!(out, "{}", "-".repeat(REFERRER_RULE_WIDTH))?;
    }
    Ok(())
}
