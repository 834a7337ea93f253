//! Matching over a finished DFA.
//!
//! Positions and lengths are counted in `char`s, not bytes. A start position
//! past the end of the input behaves like matching against the empty string.
//!
//! The `&str` entry points walk `start_pos` chars before matching, so a
//! tokenizer calling them at every position is quadratic in the input length.
//! Tokenizers should collect the input into a `Vec<char>` once and use the
//! `_chars` variants, which index the slice directly.

use super::Dfa;

impl Dfa {
    /// Whether the input from `start_pos` onwards is, as a whole, in the
    /// language.
    pub fn all_match(&self, input: &str, start_pos: usize) -> bool {
        self.accepts(input.chars().skip(start_pos))
    }

    /// [`Dfa::all_match`] over pre-split chars, in O(1) to reach `start_pos`.
    pub fn all_match_chars(&self, input: &[char], start_pos: usize) -> bool {
        self.accepts(input.get(start_pos..).unwrap_or_default().iter().copied())
    }

    /// Maximal munch: length of the longest prefix of the input starting at
    /// `start_pos` that is in the language, or 0 if there is none.
    ///
    /// A language containing the empty string also yields 0 when nothing
    /// longer matches; use [`Dfa::longest_match_opt`] to tell the two apart.
    pub fn longest_match(&self, input: &str, start_pos: usize) -> usize {
        self.longest_match_opt(input, start_pos).unwrap_or(0)
    }

    /// Like [`Dfa::longest_match`], but `None` when no prefix (not even the
    /// empty one) is accepted.
    pub fn longest_match_opt(&self, input: &str, start_pos: usize) -> Option<usize> {
        self.munch(input.chars().skip(start_pos))
    }

    /// [`Dfa::longest_match_opt`] over pre-split chars. Each call costs only
    /// the length of the match attempt, so a tokenizer loop stays linear.
    pub fn longest_match_chars(&self, input: &[char], start_pos: usize) -> Option<usize> {
        self.munch(input.get(start_pos..).unwrap_or_default().iter().copied())
    }

    fn accepts(&self, chars: impl Iterator<Item = char>) -> bool {
        let mut state = self.start();
        for c in chars {
            match self.transition(state, c) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.is_final(state)
    }

    /// Run until the DFA dies, remembering the last accepting length.
    fn munch(&self, chars: impl Iterator<Item = char>) -> Option<usize> {
        let mut state = self.start();
        let mut last_accept = if self.is_final(state) { Some(0) } else { None };

        for (consumed, c) in chars.enumerate() {
            match self.transition(state, c) {
                Some(next) => state = next,
                None => break,
            }
            if self.is_final(state) {
                last_accept = Some(consumed + 1);
            }
        }

        last_accept
    }
}
