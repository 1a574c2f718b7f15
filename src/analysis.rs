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

//! Analyses over validated functions: control flow, instruction classification, and referrers.

pub mod control_flow;
pub mod classify;
pub mod function;
pub mod referrers;

pub use classify::describe;
pub use function::{InstructionInfo, analyze, find_by_kind, find_function};
pub use referrers::{ReferrerInfo, referrers_of, referrers_of_instr};
