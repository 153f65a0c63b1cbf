//! Incremental matching of typed input against a set of hint codes.

use crate::codes::Code;
use log::debug;

/// Result of feeding one character to a [`MatchEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStep {
    /// The character was not alphabetic, or the engine has already
    /// resolved.  Nothing changed.
    Ignored,
    /// No code starts with the accumulated input.  The prefix has been
    /// reset to empty.
    NoMatch,
    /// Exactly one code remains; carries its index.
    Resolved(usize),
    /// Several codes remain; carries their indices in code order.
    Ambiguous(Vec<usize>),
}

/// Holds the typed-so-far prefix and narrows a fixed code set with it.
///
/// Indices returned by the engine refer to positions in the code list it
/// was built with, which is the same order the targets were paired in.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    codes: Vec<Code>,
    prefix: String,
    resolved: Option<usize>,
}

impl MatchEngine {
    pub fn new(codes: Vec<Code>) -> Self {
        Self {
            codes,
            prefix: String::new(),
            resolved: None,
        }
    }

    pub fn codes(&self) -> &[Code] {
        &self.codes
    }

    /// The accumulated input.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The index the engine resolved to, if any.
    pub fn resolved(&self) -> Option<usize> {
        self.resolved
    }

    /// Indices of the codes consistent with the current prefix.  With an
    /// empty prefix this is every code.
    pub fn candidates(&self) -> Vec<usize> {
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, code)| code.starts_with(&self.prefix))
            .map(|(i, _)| i)
            .collect()
    }

    /// Append `ch` to the prefix and report the new candidate set.
    ///
    /// Letters are matched case-insensitively.
    pub fn push(&mut self, ch: char) -> MatchStep {
        if self.resolved.is_some() || !ch.is_alphabetic() {
            return MatchStep::Ignored;
        }
        self.prefix.extend(ch.to_lowercase());

        let mut candidates = self.candidates();
        debug!("prefix {:?}: {} candidate(s)", self.prefix, candidates.len());
        match candidates.len() {
            0 => {
                self.prefix.clear();
                MatchStep::NoMatch
            }
            1 => {
                let index = candidates.remove(0);
                self.resolved = Some(index);
                MatchStep::Resolved(index)
            }
            _ => MatchStep::Ambiguous(candidates),
        }
    }

    /// Drop the accumulated input without resolving.
    pub fn reset(&mut self) {
        self.prefix.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::Alphabet;

    fn engine(n: usize) -> MatchEngine {
        MatchEngine::new(Alphabet::default().generate(n))
    }

    #[test]
    fn first_symbol_is_ambiguous_across_shared_prefix() {
        let mut e = engine(20);
        // aj, ak, al
        assert_eq!(e.push('a'), MatchStep::Ambiguous(vec![0, 1, 2]));
        assert_eq!(e.prefix(), "a");
        assert_eq!(e.candidates(), vec![0, 1, 2]);
    }

    #[test]
    fn unknown_symbol_is_no_match_and_resets() {
        let mut e = engine(20);
        e.push('a');
        assert_eq!(e.push('a'), MatchStep::NoMatch);
        assert_eq!(e.prefix(), "");
        assert_eq!(e.candidates().len(), 20);
    }

    #[test]
    fn symbol_outside_alphabet_is_no_match() {
        let mut e = engine(20);
        assert_eq!(e.push('z'), MatchStep::NoMatch);
        assert_eq!(e.prefix(), "");
    }

    #[test]
    fn complete_code_resolves() {
        let mut e = engine(20);
        let codes = e.codes().to_vec();
        let target = codes.iter().position(|c| c.as_str() == "sk").unwrap();
        assert!(matches!(e.push('s'), MatchStep::Ambiguous(_)));
        assert_eq!(e.push('k'), MatchStep::Resolved(target));
        assert_eq!(e.resolved(), Some(target));
    }

    #[test]
    fn single_symbol_codes_resolve_immediately() {
        let mut e = engine(9);
        assert_eq!(e.push('d'), MatchStep::Resolved(2));
    }

    #[test]
    fn unique_prefix_resolves_before_code_is_complete() {
        // aj ak al sj sk sl dj dk dl fj fk fl ja
        let mut e = engine(13);
        assert_eq!(e.push('j'), MatchStep::Resolved(12));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let mut e = engine(20);
        assert!(matches!(e.push('A'), MatchStep::Ambiguous(_)));
        assert_eq!(e.push('L'), MatchStep::Resolved(2));
    }

    #[test]
    fn non_alphabetic_input_is_ignored() {
        let mut e = engine(20);
        e.push('a');
        assert_eq!(e.push('3'), MatchStep::Ignored);
        assert_eq!(e.push(' '), MatchStep::Ignored);
        assert_eq!(e.prefix(), "a");
    }

    #[test]
    fn input_after_resolution_is_ignored() {
        let mut e = engine(9);
        e.push('a');
        assert_eq!(e.push('s'), MatchStep::Ignored);
        assert_eq!(e.resolved(), Some(0));
    }

    #[test]
    fn reset_restores_full_candidate_set() {
        let mut e = engine(20);
        e.push('f');
        assert_eq!(e.candidates().len(), 3);
        e.reset();
        assert_eq!(e.prefix(), "");
        assert_eq!(e.candidates().len(), 20);
    }
}
