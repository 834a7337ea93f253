//! Named-definition grammars.
//!
//! A grammar is an ordered list of `name -> body` lines. The first
//! definition is the start symbol. Resolution substitutes every reference to
//! another definition by its parenthesized, fully resolved body, producing
//! one flat pattern for [`Pattern::parse`](crate::automata::pattern::Pattern::parse).
//!
//! ```text
//! num   -> digit+
//! digit -> 0|1|2
//! ```
//!
//! resolves to `(0|1|2)+`.
//!
//! ## References
//!
//! At each position outside an escape, the longest defined name starting
//! there is a reference. Everything else is literal text. Names are matched
//! without word boundaries, so a short name that is a substring of a longer
//! one is only ever substituted where the longer one does not match.
//!
//! The start symbol is never substituted; its name inside a body is literal
//! text, so `a -> a(b|c)*` is simply `a.(b|c)*`.
//!
//! Literal runs of identifier characters (`[A-Za-z0-9_]`) are implicit
//! concatenation (`abb` is `a.b.b`, `while` is `w.h.i.l.e`) unless they look
//! like a misspelled reference, which is an undefined reference error:
//!
//! - a run of 2 or more characters containing `_` (the naming convention of
//!   multi-word definitions), other than the start symbol's own name;
//! - a run of 3 or more characters starting with a letter that is one edit
//!   away from a defined name (`digt` next to `digit`).

use log::debug;

use crate::error::{DfaError, Result};

/// Separator between a definition's name and its body.
const ARROW: &str = "->";

/// One `name -> body` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub body: String,
}

/// An ordered set of definitions; the first one is the start symbol.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    definitions: Vec<Definition>,
    /// Lines seen so far, blank ones included (for error positions).
    lines: usize,
}

/// A scanned body: literal text and references by definition index.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Reference(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a multi-line grammar. Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut grammar = Grammar::new();
        for line in text.lines() {
            grammar.add_line(line)?;
        }
        Ok(grammar)
    }

    /// Add one grammar line. Blank lines are accepted and ignored.
    ///
    /// # Errors
    ///
    /// [`DfaError::MalformedDefinition`] if the line has no `->` or an empty
    /// name, [`DfaError::DuplicateDefinition`] if the name already exists.
    pub fn add_line(&mut self, line: &str) -> Result<()> {
        self.lines += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        let malformed = || DfaError::MalformedDefinition {
            line: self.lines,
            text: trimmed.to_string(),
        };
        let (name, body) = trimmed.split_once(ARROW).ok_or_else(malformed)?;
        if name.trim().is_empty() {
            return Err(malformed());
        }
        self.add_definition(name, body)
    }

    /// Add a definition directly. Name and body are trimmed.
    pub fn add_definition(&mut self, name: &str, body: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DfaError::MalformedDefinition {
                line: self.lines,
                text: format!("{} {}", ARROW, body.trim()),
            });
        }
        if self.definitions.iter().any(|d| d.name == name) {
            return Err(DfaError::DuplicateDefinition { name: name.to_string() });
        }
        self.definitions.push(Definition {
            name: name.to_string(),
            body: body.trim().to_string(),
        });
        Ok(())
    }

    /// Name of the first definition, if any.
    pub fn start_symbol(&self) -> Option<&str> {
        self.definitions.first().map(|d| d.name.as_str())
    }

    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Substitute all references reachable from the start symbol and return
    /// its flat pattern.
    ///
    /// # Errors
    ///
    /// [`DfaError::EmptyPattern`] for an empty grammar or a start symbol that
    /// resolves to nothing, [`DfaError::UndefinedReference`] and
    /// [`DfaError::CyclicReference`] as described in the module docs.
    pub fn resolve(&self) -> Result<String> {
        if self.definitions.is_empty() {
            return Err(DfaError::EmptyPattern);
        }

        // Longest names first, so the first hit at a position is the longest.
        // The start symbol is never a substitution target: its name inside a
        // body is literal text.
        let mut by_length: Vec<usize> = (1..self.definitions.len()).collect();
        by_length.sort_by(|&a, &b| {
            let (a, b) = (&self.definitions[a].name, &self.definitions[b].name);
            b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b))
        });

        let mut resolver = Resolver {
            grammar: self,
            by_length,
            marks: vec![Mark::Unvisited; self.definitions.len()],
            resolved: vec![None; self.definitions.len()],
        };
        let pattern = resolver.resolve(0)?;

        let unused: Vec<&str> = resolver
            .marks
            .iter()
            .zip(&self.definitions)
            .filter(|(mark, _)| **mark == Mark::Unvisited)
            .map(|(_, d)| d.name.as_str())
            .collect();
        if !unused.is_empty() {
            debug!("ignoring definitions unreachable from '{}': {:?}", self.definitions[0].name, unused);
        }

        if pattern.chars().all(char::is_whitespace) {
            return Err(DfaError::EmptyPattern);
        }
        debug!(
            "resolved '{}' to a pattern of {} chars",
            self.definitions[0].name,
            pattern.chars().count()
        );
        Ok(pattern)
    }
}

/// Memoized depth-first substitution with cycle detection.
struct Resolver<'g> {
    grammar: &'g Grammar,
    by_length: Vec<usize>,
    marks: Vec<Mark>,
    resolved: Vec<Option<String>>,
}

impl Resolver<'_> {
    fn resolve(&mut self, index: usize) -> Result<String> {
        match self.marks[index] {
            Mark::Done => {
                if let Some(done) = &self.resolved[index] {
                    return Ok(done.clone());
                }
            },
            Mark::InProgress => {
                return Err(DfaError::CyclicReference {
                    name: self.grammar.definitions[index].name.clone(),
                });
            },
            Mark::Unvisited => {},
        }

        self.marks[index] = Mark::InProgress;
        let pieces = self.scan(index)?;
        let mut out = String::new();
        for piece in pieces {
            match piece {
                Piece::Text(text) => out.push_str(&text),
                Piece::Reference(target) => {
                    let body = self.resolve(target)?;
                    out.push('(');
                    out.push_str(&body);
                    out.push(')');
                },
            }
        }
        self.marks[index] = Mark::Done;
        self.resolved[index] = Some(out.clone());
        Ok(out)
    }

    /// Split a body into literal text and references.
    fn scan(&self, index: usize) -> Result<Vec<Piece>> {
        let definition = &self.grammar.definitions[index];
        let chars: Vec<char> = definition.body.chars().collect();
        let mut pieces: Vec<Piece> = Vec::new();
        let mut text = String::new();
        let mut run = String::new();
        let mut i = 0;

        while i < chars.len() {
            if chars[i] == '\\' {
                self.check_run(&mut run, definition)?;
                text.push('\\');
                if let Some(&next) = chars.get(i + 1) {
                    text.push(next);
                }
                i += 2;
                continue;
            }

            if let Some(target) = self.name_at(&chars[i..]) {
                self.check_run(&mut run, definition)?;
                if !text.is_empty() {
                    pieces.push(Piece::Text(std::mem::take(&mut text)));
                }
                pieces.push(Piece::Reference(target));
                i += self.grammar.definitions[target].name.chars().count();
                continue;
            }

            let c = chars[i];
            if is_identifier_char(c) {
                run.push(c);
            } else {
                self.check_run(&mut run, definition)?;
            }
            text.push(c);
            i += 1;
        }

        self.check_run(&mut run, definition)?;
        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }
        Ok(pieces)
    }

    /// Longest defined name that is a prefix of `rest`.
    fn name_at(&self, rest: &[char]) -> Option<usize> {
        self.by_length.iter().copied().find(|&candidate| {
            let name = &self.grammar.definitions[candidate].name;
            let len = name.chars().count();
            len <= rest.len() && name.chars().zip(rest).all(|(a, &b)| a == b)
        })
    }

    /// Reject a finished literal identifier run that reads as a misspelled
    /// reference, then clear it.
    fn check_run(&self, run: &mut String, definition: &Definition) -> Result<()> {
        let chars: Vec<char> = run.chars().collect();
        let is_start_name = *run == self.grammar.definitions[0].name;
        let underscored = chars.len() >= 2 && chars.contains(&'_') && !is_start_name;
        let near_name = chars.len() >= 3
            && chars[0].is_ascii_alphabetic()
            && self.by_length.iter().any(|&index| {
                let name: Vec<char> = self.grammar.definitions[index].name.chars().collect();
                name.len() >= 3 && within_one_edit(&chars, &name)
            });

        if underscored || near_name {
            return Err(DfaError::UndefinedReference {
                name: std::mem::take(run),
                definition: definition.name.clone(),
            });
        }
        run.clear();
        Ok(())
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `a` turns into `b` with at most one insertion, deletion or
/// substitution.
fn within_one_edit(a: &[char], b: &[char]) -> bool {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if long.len() - short.len() > 1 {
        return false;
    }
    let prefix = short.iter().zip(long).take_while(|(x, y)| x == y).count();
    if short.len() == long.len() {
        short[prefix..].iter().skip(1).eq(long[prefix..].iter().skip(1))
    } else {
        short[prefix..] == long[prefix + 1..]
    }
}
