//! DFA persistence.
//!
//! ## Text format
//!
//! ```text
//! 3                 number of states N
//! 011               finality bitstring, one flag per state id
//! 0 48 1 49 2       state id, then (char code, target) pairs
//! 1 48 1 49 2
//! 2 48 1 49 2
//! ```
//!
//! Character codes are Unicode scalar values in decimal. The start state is
//! always state 0. Import accepts `\r\n` line endings and trailing blank
//! lines, validates every id, and re-minimizes the result.
//!
//! ## JSON
//!
//! The same table is available through serde as [`DfaTable`]; `Dfa`
//! serializes through it, and deserialization goes through the same
//! validation as text import.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::minimize::{minimize_dfa, prune_unreachable};
use super::{Dfa, DfaState, StateId};
use crate::error::{DfaError, Result};

/// Line of the first per-state row in the text format (1-based).
const FIRST_STATE_LINE: usize = 3;

/// Flat, serializable view of a DFA with the start state at index 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfaTable {
    /// Finality flag per state.
    pub finals: Vec<bool>,
    /// Outgoing `(char code, target)` pairs per state, in character order.
    pub transitions: Vec<Vec<(u32, StateId)>>,
}

impl From<&Dfa> for DfaTable {
    fn from(dfa: &Dfa) -> Self {
        let rebased;
        let dfa = if dfa.start() == 0 {
            dfa
        } else {
            rebased = prune_unreachable(dfa);
            &rebased
        };

        DfaTable {
            finals: dfa.states().iter().map(|s| s.is_final).collect(),
            transitions: dfa
                .states()
                .iter()
                .map(|s| s.transitions.iter().map(|(&c, &t)| (c as u32, t)).collect())
                .collect(),
        }
    }
}

impl From<Dfa> for DfaTable {
    fn from(dfa: Dfa) -> Self {
        DfaTable::from(&dfa)
    }
}

impl TryFrom<DfaTable> for Dfa {
    type Error = DfaError;

    /// Validate the table and minimize it. Errors report the line the
    /// offending state occupies in the text format.
    fn try_from(table: DfaTable) -> Result<Self> {
        let n = table.finals.len();
        if n == 0 {
            return Err(DfaError::import(1, "a DFA needs at least one state"));
        }
        if table.transitions.len() != n {
            return Err(DfaError::import(
                FIRST_STATE_LINE + table.transitions.len().min(n),
                format!("expected {} state rows, found {}", n, table.transitions.len()),
            ));
        }

        let mut states = Vec::with_capacity(n);
        for (id, (is_final, row)) in table.finals.into_iter().zip(table.transitions).enumerate() {
            let line = FIRST_STATE_LINE + id;
            let mut state = DfaState { transitions: Default::default(), is_final };
            for (code, target) in row {
                let c = char::from_u32(code).ok_or_else(|| {
                    DfaError::import(line, format!("{} is not a valid character code", code))
                })?;
                if target as usize >= n {
                    return Err(DfaError::import(
                        line,
                        format!("target state {} out of range (N = {})", target, n),
                    ));
                }
                if state.transitions.insert(c, target).is_some() {
                    return Err(DfaError::import(
                        line,
                        format!("duplicate transition on {:?}", c),
                    ));
                }
            }
            states.push(state);
        }

        let imported = Dfa::from_states(states, 0);
        let minimized = minimize_dfa(&imported);
        debug!(
            "imported DFA: {} states, {} after minimization",
            n,
            minimized.state_count()
        );
        Ok(minimized)
    }
}

impl Dfa {
    /// Render the DFA in the persisted text format.
    pub fn export(&self) -> String {
        self.to_string()
    }

    /// Rebuild a DFA from its persisted text form. The result is minimized.
    ///
    /// # Errors
    ///
    /// Returns [`DfaError::ImportFormat`] with the 1-based line number when
    /// the text does not have the expected shape.
    pub fn import(text: &str) -> Result<Dfa> {
        Dfa::try_from(parse_table(text)?)
    }

    /// Write the text format to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.export())?;
        Ok(())
    }

    /// Read the text format from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Dfa> {
        let text = std::fs::read_to_string(path)?;
        Dfa::import(&text)
    }

    /// Serialize the DFA table as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&DfaTable::from(self))?)
    }

    /// Deserialize a DFA from JSON, e.g. from `include_str!`.
    pub fn from_json(json: &str) -> Result<Dfa> {
        let table: DfaTable = serde_json::from_str(json)?;
        Dfa::try_from(table)
    }
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = DfaTable::from(self);
        writeln!(f, "{}", table.finals.len())?;
        for &is_final in &table.finals {
            f.write_str(if is_final { "1" } else { "0" })?;
        }
        writeln!(f)?;
        for (id, row) in table.transitions.iter().enumerate() {
            write!(f, "{}", id)?;
            for (code, target) in row {
                write!(f, " {} {}", code, target)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Dfa {
    type Err = DfaError;

    fn from_str(s: &str) -> Result<Self> {
        Dfa::import(s)
    }
}

impl Serialize for Dfa {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        DfaTable::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Dfa {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let table = DfaTable::deserialize(deserializer)?;
        Dfa::try_from(table).map_err(serde::de::Error::custom)
    }
}

/// Parse the text format into a table, checking shape and ids but not
/// target ranges (those are checked on conversion).
fn parse_table(text: &str) -> Result<DfaTable> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let count_line = lines.first().map(|l| l.trim()).unwrap_or("");
    let n: usize = count_line
        .parse()
        .map_err(|_| DfaError::import(1, format!("expected a state count, found '{}'", count_line)))?;
    if n == 0 {
        return Err(DfaError::import(1, "a DFA needs at least one state"));
    }

    let bits = lines
        .get(1)
        .map(|l| l.trim())
        .ok_or_else(|| DfaError::import(2, "missing finality bitstring"))?;
    let finals: Vec<bool> = bits
        .chars()
        .map(|c| match c {
            '1' => Ok(true),
            '0' => Ok(false),
            other => Err(DfaError::import(2, format!("invalid finality flag {:?}", other))),
        })
        .collect::<Result<_>>()?;
    if finals.len() != n {
        return Err(DfaError::import(
            2,
            format!("expected {} finality flags, found {}", n, finals.len()),
        ));
    }

    let rows = &lines[2..];
    if rows.len() < n {
        return Err(DfaError::import(
            FIRST_STATE_LINE + rows.len(),
            format!("expected {} state lines, found {}", n, rows.len()),
        ));
    }
    if rows.len() > n {
        return Err(DfaError::import(FIRST_STATE_LINE + n, "unexpected content after the last state"));
    }

    let mut transitions = Vec::with_capacity(n);
    for (id, row) in rows.iter().enumerate() {
        let line = FIRST_STATE_LINE + id;
        let numbers: Vec<u32> = row
            .split_whitespace()
            .map(|tok| {
                tok.parse::<u32>()
                    .map_err(|_| DfaError::import(line, format!("'{}' is not a number", tok)))
            })
            .collect::<Result<_>>()?;

        match numbers.split_first() {
            Some((&row_id, _)) if row_id as usize != id => {
                return Err(DfaError::import(
                    line,
                    format!("expected state {}, found state {}", id, row_id),
                ));
            },
            Some((_, pairs)) if pairs.len() % 2 == 0 => {
                transitions.push(pairs.chunks(2).map(|p| (p[0], p[1])).collect());
            },
            Some(_) => {
                return Err(DfaError::import(line, "transition list has an odd number of values"));
            },
            None => return Err(DfaError::import(line, format!("missing id for state {}", id))),
        }
    }

    Ok(DfaTable { finals, transitions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::compile_pattern;

    fn import_error_line(text: &str) -> usize {
        match Dfa::import(text) {
            Err(DfaError::ImportFormat { line, .. }) => line,
            other => panic!("expected import error, got {:?}", other),
        }
    }

    #[test]
    fn test_export_shape() {
        let dfa = compile_pattern("(0|1)*1").unwrap();
        assert_eq!(dfa.export(), "2\n01\n0 48 0 49 1\n1 48 0 49 1\n");
    }

    #[test]
    fn test_state_without_transitions() {
        let dfa = compile_pattern("ab").unwrap();
        assert_eq!(dfa.export(), "3\n001\n0 97 1\n1 98 2\n2\n");
    }

    #[test]
    fn test_import_accepts_crlf_and_trailing_newlines() {
        let dfa = Dfa::import("2\r\n01\r\n0 48 0 49 1\r\n1 48 0 49 1\r\n\r\n").unwrap();
        assert_eq!(dfa.state_count(), 2);
        assert!(dfa.all_match("1", 0));
        assert!(!dfa.all_match("10", 0));
    }

    #[test]
    fn test_import_minimizes() {
        // States 1 and 2 are equivalent.
        let dfa = Dfa::import("3\n011\n0 97 1 98 2\n1\n2\n").unwrap();
        assert_eq!(dfa.state_count(), 2);
        assert!(dfa.all_match("a", 0));
        assert!(dfa.all_match("b", 0));
    }

    #[test]
    fn test_import_errors_carry_line_numbers() {
        assert_eq!(import_error_line(""), 1);
        assert_eq!(import_error_line("x\n1\n0\n"), 1);
        assert_eq!(import_error_line("0\n\n"), 1);
        assert_eq!(import_error_line("2\n1\n0\n1\n"), 2);
        assert_eq!(import_error_line("1\n2\n0\n"), 2);
        assert_eq!(import_error_line("2\n01\n0 48 1\n"), 4);
        assert_eq!(import_error_line("2\n01\n0 48 1\n2\n"), 4);
        assert_eq!(import_error_line("2\n01\n0 48\n1\n"), 3);
        assert_eq!(import_error_line("2\n01\n0 48 7\n1\n"), 3);
        assert_eq!(import_error_line("2\n01\n0 48 1 48 0\n1\n"), 3);
        assert_eq!(import_error_line("1\n1\n0\nextra\n"), 4);
        assert_eq!(import_error_line("1\n1\n0 55296 0\n"), 3);
    }

    #[test]
    fn test_display_and_from_str_agree() {
        let dfa = compile_pattern("a(b|c)*").unwrap();
        let parsed: Dfa = dfa.to_string().parse().unwrap();
        assert_eq!(parsed, dfa);
    }

    #[test]
    fn test_json_roundtrip() {
        let dfa = compile_pattern("x(y|z)+").unwrap();
        let json = dfa.to_json().unwrap();
        let loaded = Dfa::from_json(&json).unwrap();
        assert_eq!(loaded, dfa);

        let via_serde: Dfa = serde_json::from_str(&serde_json::to_string(&dfa).unwrap()).unwrap();
        assert_eq!(via_serde, dfa);
    }

    #[test]
    fn test_json_rejects_bad_target() {
        let json = r#"{ "finals": [true], "transitions": [[[97, 3]]] }"#;
        assert!(matches!(Dfa::from_json(json), Err(DfaError::ImportFormat { line: 3, .. })));
        assert!(serde_json::from_str::<Dfa>(json).is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let dfa = compile_pattern("(0|1)*1").unwrap();
        let path = std::env::temp_dir().join(format!("lexdfa_persist_{}.dfa", std::process::id()));

        dfa.save(&path).unwrap();
        let loaded = Dfa::load(&path).unwrap();
        assert_eq!(loaded, dfa);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        assert!(matches!(
            Dfa::load("/nonexistent/lexdfa/missing.dfa"),
            Err(DfaError::Io(_))
        ));
    }
}
