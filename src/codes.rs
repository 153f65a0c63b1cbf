//! Hint code generation.
//!
//! Every detected target receives a short code typed on the home row.  The
//! codes of one batch are always *prefix-free*: once a full code has been
//! typed no other code can still be in progress, so a match never has to
//! wait for more input.
//!
//! Batches never mix lengths.  With the default nine-symbol alphabet:
//!
//! | targets   | codes                                             |
//! |-----------|---------------------------------------------------|
//! | 0         | none                                              |
//! | 1 – 9     | `a`, `s`, `d`, … in alphabet order                |
//! | 10 – 81   | two symbols, hand-alternating pairs first         |
//! | 82 – 729  | three symbols in alphabet order                   |
//!
//! Larger batches keep growing the length by one symbol at a time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default symbols: the home row.
pub const DEFAULT_SYMBOLS: &str = "asdfghjkl";
/// Symbols typed by the left hand.
pub const DEFAULT_LEFT_HAND: &str = "asdf";
/// Symbols typed by the right hand.  `g` and `h` sit under the index
/// fingers' reach and belong to neither hand.
pub const DEFAULT_RIGHT_HAND: &str = "jkl";

/// A typeable hint code.
///
/// Always non-empty and lowercase; only [`Alphabet::generate`] creates
/// codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Code(String);

impl Code {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Codes are never empty; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this code begins with `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    fn from_symbols(symbols: &[char]) -> Self {
        Code(symbols.iter().collect())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors from building an [`Alphabet`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlphabetError {
    #[error("alphabet needs at least two symbols, got {0}")]
    TooSmall(usize),
    #[error("symbol {0:?} is not a lowercase ASCII letter")]
    InvalidSymbol(char),
    #[error("symbol {0:?} appears more than once")]
    Duplicate(char),
    #[error("hand symbol {0:?} is not part of the alphabet")]
    UnknownHandSymbol(char),
    #[error("symbol {0:?} is assigned to both hands")]
    BothHands(char),
}

/// The ordered symbol set codes are drawn from, split into the symbols
/// each hand types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
    left: Vec<char>,
    right: Vec<char>,
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.chars().collect(),
            left: DEFAULT_LEFT_HAND.chars().collect(),
            right: DEFAULT_RIGHT_HAND.chars().collect(),
        }
    }
}

impl Alphabet {
    /// Build an alphabet from its symbols and the per-hand subsets.
    ///
    /// Symbols must be distinct lowercase ASCII letters (matching is
    /// case-insensitive, so uppercase would be unreachable).  Hand subsets
    /// may leave symbols unassigned but must not overlap.
    pub fn new(symbols: &str, left: &str, right: &str) -> Result<Self, AlphabetError> {
        let symbols: Vec<char> = symbols.chars().collect();
        if symbols.len() < 2 {
            return Err(AlphabetError::TooSmall(symbols.len()));
        }
        for (i, &c) in symbols.iter().enumerate() {
            if !c.is_ascii_lowercase() {
                return Err(AlphabetError::InvalidSymbol(c));
            }
            if symbols[..i].contains(&c) {
                return Err(AlphabetError::Duplicate(c));
            }
        }

        let left: Vec<char> = left.chars().collect();
        let right: Vec<char> = right.chars().collect();
        for &c in left.iter().chain(right.iter()) {
            if !symbols.contains(&c) {
                return Err(AlphabetError::UnknownHandSymbol(c));
            }
        }
        if let Some(&c) = left.iter().find(|c| right.contains(c)) {
            return Err(AlphabetError::BothHands(c));
        }

        Ok(Self {
            symbols,
            left,
            right,
        })
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Generate `count` distinct, prefix-free codes, shortest possible,
    /// assigned in the order they should be handed to targets.
    pub fn generate(&self, count: usize) -> Vec<Code> {
        if count == 0 {
            return Vec::new();
        }
        let size = self.symbols.len();
        if count <= size {
            return self.symbols[..count]
                .iter()
                .map(|&c| Code::from_symbols(&[c]))
                .collect();
        }
        if count <= size * size {
            return self.pairs(count);
        }
        self.fixed_length(self.length_for(count), count)
    }

    /// Two-symbol codes: hand-alternating pairs first, then the rest.
    fn pairs(&self, count: usize) -> Vec<Code> {
        let mut codes = Vec::with_capacity(count);
        let mut emitted = vec![false; self.symbols.len() * self.symbols.len()];

        for alternating_pass in [true, false] {
            for (i, &first) in self.symbols.iter().enumerate() {
                for (j, &second) in self.symbols.iter().enumerate() {
                    if codes.len() == count {
                        return codes;
                    }
                    let slot = i * self.symbols.len() + j;
                    if emitted[slot] {
                        continue;
                    }
                    if alternating_pass && !self.alternates(first, second) {
                        continue;
                    }
                    emitted[slot] = true;
                    codes.push(Code::from_symbols(&[first, second]));
                }
            }
        }
        codes
    }

    /// All codes of one `length`, enumerated like an odometer whose
    /// rightmost symbol turns fastest.
    fn fixed_length(&self, length: usize, count: usize) -> Vec<Code> {
        let size = self.symbols.len();
        let mut digits = vec![0usize; length];
        let mut codes = Vec::with_capacity(count);
        let mut buf = Vec::with_capacity(length);

        while codes.len() < count {
            buf.clear();
            buf.extend(digits.iter().map(|&d| self.symbols[d]));
            codes.push(Code::from_symbols(&buf));

            // Advance; `length_for` guarantees we never wrap past the end.
            for d in digits.iter_mut().rev() {
                *d += 1;
                if *d < size {
                    break;
                }
                *d = 0;
            }
        }
        codes
    }

    /// Shortest code length whose full enumeration covers `count` codes.
    fn length_for(&self, count: usize) -> usize {
        let size = self.symbols.len();
        let mut length = 1;
        let mut capacity = size;
        while capacity < count {
            length += 1;
            capacity = capacity.saturating_mul(size);
        }
        length
    }

    fn alternates(&self, first: char, second: char) -> bool {
        (self.left.contains(&first) && self.right.contains(&second))
            || (self.right.contains(&first) && self.left.contains(&second))
    }
}

/// Whether no code in `codes` is a prefix of another (duplicates count as
/// a conflict).
pub fn is_prefix_free(codes: &[Code]) -> bool {
    let mut sorted: Vec<&str> = codes.iter().map(Code::as_str).collect();
    sorted.sort_unstable();
    // After sorting, a prefix always sorts immediately before some string
    // it prefixes, so adjacent pairs suffice.
    sorted.windows(2).all(|w| !w[1].starts_with(w[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn strs(codes: &[Code]) -> Vec<&str> {
        codes.iter().map(Code::as_str).collect()
    }

    #[test]
    fn zero_targets_gives_no_codes() {
        assert!(Alphabet::default().generate(0).is_empty());
    }

    #[test]
    fn nine_targets_use_single_symbols_in_order() {
        let codes = Alphabet::default().generate(9);
        assert_eq!(strs(&codes), ["a", "s", "d", "f", "g", "h", "j", "k", "l"]);
    }

    #[test]
    fn few_targets_take_alphabet_prefix() {
        let codes = Alphabet::default().generate(3);
        assert_eq!(strs(&codes), ["a", "s", "d"]);
    }

    #[test]
    fn twenty_targets_are_all_hand_alternating_pairs() {
        let alphabet = Alphabet::default();
        let codes = alphabet.generate(20);
        assert_eq!(codes.len(), 20);
        assert!(codes.iter().all(|c| c.len() == 2));
        assert_eq!(
            &strs(&codes)[..6],
            ["aj", "ak", "al", "sj", "sk", "sl"]
        );
        for code in &codes {
            let mut chars = code.as_str().chars();
            let (a, b) = (chars.next().unwrap(), chars.next().unwrap());
            assert!(alphabet.alternates(a, b), "{} is not alternating", code);
        }
    }

    #[test]
    fn alternating_pairs_precede_same_hand_pairs() {
        let alphabet = Alphabet::default();
        let codes = alphabet.generate(40);
        let first_same_hand = codes
            .iter()
            .position(|c| {
                let mut chars = c.as_str().chars();
                !alphabet.alternates(chars.next().unwrap(), chars.next().unwrap())
            })
            .expect("40 codes must include same-hand pairs");
        // 4 left × 3 right symbols, in both orders.
        assert_eq!(first_same_hand, 24);
        assert_eq!(codes[24].as_str(), "aa");
        assert!(codes[first_same_hand..].iter().all(|c| {
            let mut chars = c.as_str().chars();
            !alphabet.alternates(chars.next().unwrap(), chars.next().unwrap())
        }));
    }

    #[test]
    fn eighty_one_targets_use_every_pair() {
        let codes = Alphabet::default().generate(81);
        let unique: HashSet<&str> = strs(&codes).into_iter().collect();
        assert_eq!(unique.len(), 81);
        assert!(codes.iter().all(|c| c.len() == 2));
    }

    #[test]
    fn past_pairs_every_code_has_three_symbols() {
        let codes = Alphabet::default().generate(82);
        assert_eq!(codes.len(), 82);
        assert!(codes.iter().all(|c| c.len() == 3));
        assert_eq!(codes[0].as_str(), "aaa");
        assert_eq!(codes[1].as_str(), "aas");
        assert_eq!(codes[9].as_str(), "asa");
    }

    #[test]
    fn generation_is_distinct_and_prefix_free_for_hundreds() {
        let alphabet = Alphabet::default();
        for n in (0..=800).step_by(7).chain([9, 10, 81, 82, 729, 730]) {
            let codes = alphabet.generate(n);
            assert_eq!(codes.len(), n, "wrong count for {}", n);
            let unique: HashSet<&Code> = codes.iter().collect();
            assert_eq!(unique.len(), n, "duplicates for {}", n);
            assert!(is_prefix_free(&codes), "prefix conflict for {}", n);
        }
    }

    #[test]
    fn beyond_three_symbols_grows_to_four() {
        let codes = Alphabet::default().generate(730);
        assert!(codes.iter().all(|c| c.len() == 4));
    }

    #[test]
    fn prefix_check_detects_conflicts() {
        let alphabet = Alphabet::default();
        let mut codes = alphabet.generate(10);
        assert!(is_prefix_free(&codes));
        codes.push(Code::from_symbols(&['a']));
        assert!(!is_prefix_free(&codes));
    }

    #[test]
    fn custom_alphabet_without_hands_still_generates_pairs() {
        let alphabet = Alphabet::new("qwer", "", "").unwrap();
        let codes = alphabet.generate(5);
        assert_eq!(strs(&codes), ["qq", "qw", "qe", "qr", "wq"]);
    }

    #[test]
    fn alphabet_validation() {
        assert_eq!(Alphabet::new("a", "", ""), Err(AlphabetError::TooSmall(1)));
        assert_eq!(
            Alphabet::new("aS", "", ""),
            Err(AlphabetError::InvalidSymbol('S'))
        );
        assert_eq!(
            Alphabet::new("aba", "", ""),
            Err(AlphabetError::Duplicate('a'))
        );
        assert_eq!(
            Alphabet::new("ab", "x", ""),
            Err(AlphabetError::UnknownHandSymbol('x'))
        );
        assert_eq!(
            Alphabet::new("ab", "a", "a"),
            Err(AlphabetError::BothHands('a'))
        );
        assert!(Alphabet::new(DEFAULT_SYMBOLS, DEFAULT_LEFT_HAND, DEFAULT_RIGHT_HAND).is_ok());
    }
}
