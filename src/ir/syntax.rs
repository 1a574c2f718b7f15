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

//! Lexical helpers shared by the instruction parsers and the listing reader.
//!
//! Listings are line based, but a single line may still nest: string literals can contain any
//! character, and types or argument lists nest brackets. Everything here only looks at the
//! "top level" of a line, i.e. outside string literals and outside `()`, `[]`, `{}`.

/// Characters of `s` at nesting depth zero, with their byte offsets.
///
/// An opening bracket is reported when it enters depth one, a closing bracket when it returns to
/// depth zero. Characters inside string literals (quotes included) are never reported.
pub fn top_level(s: &str) -> impl Iterator<Item=(usize, char)> + '_ {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    s.char_indices().filter(move |&(_, c)| {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            return false;
        }
        match c {
            '"' => {
                in_string = true;
                false
            }
            '(' | '[' | '{' => {
                depth += 1;
                depth == 1
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                depth == 0
            }
            _ => depth == 0,
        }
    })
}

/// Split `s` on every top-level occurrence of `sep`.
pub fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (k, c) in top_level(s) {
        if c == sep {
            parts.push(&s[start..k]);
            start = k + sep.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Split a comma-separated list, trimming each item. An empty (or blank) list has no items.
pub fn split_list(s: &str) -> Vec<&str> {
    if s.trim().is_empty() { return Vec::new(); }
    split_top_level(s, ',').into_iter().map(str::trim).collect()
}

/// Byte offset of the first top-level occurrence of `pat`.
pub fn find_top_level(s: &str, pat: &str) -> Option<usize> {
    top_level(s).map(|(k, _)| k).find(|&k| s[k..].starts_with(pat))
}

/// Byte offset of the bracket closing the one opened at `open`.
pub fn matching_close(s: &str, open: usize) -> Option<usize> {
    top_level(s).find(|&(k, _)| k > open).and_then(|(k, c)| {
        matches!(c, ')' | ']' | '}').then(|| k)
    })
}

/// Length in bytes of the double-quoted string literal at the start of `s` (quotes included).
pub fn string_literal_len(s: &str) -> Option<usize> {
    let mut chars = s.char_indices();
    if !matches!(chars.next(), Some((_, '"'))) { return None; }
    let mut escaped = false;
    for (k, c) in chars {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(k + 1),
            _ => {}
        }
    }
    None
}

/// Identifiers: parameters, package members, builtins. Qualified names (`fmt.Println`) and
/// synthetic names (`init$guard`) are accepted as well.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '$'))
}

#[cfg(test)]
mod tests {
    use itertools::assert_equal;
    use super::{find_top_level, is_identifier, matching_close, split_list, split_top_level,
                string_literal_len};

    #[test]
    fn test_split_respects_nesting() {
        assert_equal(
            split_list(r#""mov {value}, {result}":string, t0, f(a, b), m[k]"#),
            [r#""mov {value}, {result}":string"#, "t0", "f(a, b)", "m[k]"],
        );
        assert_equal(split_top_level("t1 + \"a b\":string", ' '), ["t1", "+", "\"a b\":string"]);
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn test_find_and_match() {
        assert_eq!(find_top_level(r#"t0[" = ":string] = t1"#, " = "), Some(16));
        assert_eq!(find_top_level(r#"f("a = b":string)"#, " = "), None);
        let header = "getFromMap(m map[string]int, f func(int) bool) int";
        assert_eq!(matching_close(header, 10), Some(header.len() - 5));
    }

    #[test]
    fn test_literals_and_names() {
        assert_eq!(string_literal_len(r#""a\"b":string"#), Some(6));
        assert_eq!(string_literal_len(r#""open"#), None);
        assert!(is_identifier("init$guard"));
        assert!(is_identifier("fmt.Println"));
        assert!(!is_identifier("42"));
        assert!(!is_identifier(""));
    }
}
