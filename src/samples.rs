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

//! Sample listings shared by the tests.

pub const MAP_OPERATIONS: &str = include_str!("../demos/map-operations.ssa");
pub const TINYGO_PATTERN: &str = include_str!("../demos/tinygo-style.ssa");
pub const LOOP: &str = include_str!("../demos/loop.ssa");

pub const ALL_SAMPLES: [&str; 3] = [MAP_OPERATIONS, TINYGO_PATTERN, LOOP];
