use crate::alphabet::{Alphabet, AlphabetError};
use log::{debug, trace, warn};
use std::cmp::Ordering;

/// Ordinal of the index handed out for an empty collection: the symbol
/// just above the bottom of the alphabet, leaving room on both sides.
const INITIAL_ORDINAL: usize = 1;

/// Errors that can occur while validating or deriving indices.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum IndexError {
    #[error("index must not be empty")]
    Empty,
    #[error("invalid index '{index}': symbol '{symbol}' is not in the alphabet")]
    UnknownSymbol { index: String, symbol: char },
    #[error("invalid index '{index}': an index cannot end with '{start}'")]
    TrailingStart { index: String, start: char },
    #[error("an alphabet of {len} symbol(s) is too small to index over")]
    AlphabetTooSmall { len: usize },
    #[error(transparent)]
    Alphabet(#[from] AlphabetError),
}

/// Derives string sort keys over a fixed alphabet.
///
/// An index is a non-empty string of alphabet symbols, read as a base-N
/// fraction with the most significant symbol first. Keys never end with
/// the lowest symbol, so every value has exactly one representation and
/// plain ordinal-wise comparison matches numeric order. All operations
/// are pure: they validate their inputs, return freshly allocated
/// strings, and never touch shared state.
#[derive(Debug, Clone)]
pub struct Indexer {
    alphabet: Alphabet,
    initial: char,
}

impl Indexer {
    /// Create an indexer that derives keys over the given alphabet.
    ///
    /// Fails if the alphabet has fewer than two symbols; with a single
    /// symbol there is no room between the bottom of the alphabet and
    /// its midpoint, and no symbol left for an initial index.
    pub fn new(alphabet: Alphabet) -> Result<Self, IndexError> {
        if alphabet.len() < 2 {
            return Err(IndexError::AlphabetTooSmall {
                len: alphabet.len(),
            });
        }
        let initial = alphabet.to_symbol(INITIAL_ORDINAL)?;
        Ok(Self { alphabet, initial })
    }

    /// The alphabet this indexer derives keys over.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// The index for the first item of an empty collection.
    ///
    /// A single symbol one above the bottom of the alphabet ("B" for
    /// A-Z), so items can still be placed before it as well as after it.
    pub fn new_index(&self) -> String {
        self.initial.to_string()
    }

    /// Check that a string is a well-formed index.
    ///
    /// A well-formed index is non-empty, built only from alphabet
    /// symbols, and does not end with the lowest symbol (a trailing
    /// lowest symbol adds nothing to the value, and banning it keeps
    /// the representation canonical). Malformed input is never patched
    /// up, only reported.
    pub fn validate_index(&self, index: &str) -> Result<(), IndexError> {
        if index.is_empty() {
            return Err(IndexError::Empty);
        }
        for symbol in index.chars() {
            if !self.alphabet.contains(symbol) {
                return Err(IndexError::UnknownSymbol {
                    index: index.to_owned(),
                    symbol,
                });
            }
        }
        if index.ends_with(self.alphabet.start()) {
            return Err(IndexError::TrailingStart {
                index: index.to_owned(),
                start: self.alphabet.start(),
            });
        }
        Ok(())
    }

    /// Compare two indices by their fractional value.
    ///
    /// Positions past the end of the shorter index read as the lowest
    /// symbol. The alphabet's ordinal order is authoritative, which
    /// matters for alphabets whose symbol order differs from `char`
    /// order; for A-Z this coincides with plain string comparison.
    pub fn compare_indices(&self, a: &str, b: &str) -> Result<Ordering, IndexError> {
        self.validate_index(a)?;
        self.validate_index(b)?;
        self.compare_valid(a, b)
    }

    fn compare_valid(&self, a: &str, b: &str) -> Result<Ordering, IndexError> {
        let mut left = a.chars();
        let mut right = b.chars();
        loop {
            let (l, r) = match (left.next(), right.next()) {
                (None, None) => return Ok(Ordering::Equal),
                (l, r) => (l, r),
            };
            let l = match l {
                Some(symbol) => self.alphabet.to_ordinal(symbol)?,
                None => 0,
            };
            let r = match r {
                Some(symbol) => self.alphabet.to_ordinal(symbol)?,
                None => 0,
            };
            match l.cmp(&r) {
                Ordering::Equal => {}
                order => return Ok(order),
            }
        }
    }

    /// Derive an index that sorts strictly between two existing indices.
    ///
    /// The arguments may be given in either order. The result reuses the
    /// shared prefix of the two bounds and splits the first position
    /// where they diverge; when the bounds are flush against each other
    /// at the current length, the result grows one symbol deeper until
    /// there is room. Passing two numerically equal indices is a caller
    /// error with a defined outcome: a warning is logged and the single
    /// alphabet-midpoint symbol is returned, since no value can sort
    /// inside an empty gap.
    pub fn midpoint_index(&self, before: &str, after: &str) -> Result<String, IndexError> {
        self.validate_index(before)?;
        self.validate_index(after)?;

        let (before, after) = match self.compare_valid(before, after)? {
            Ordering::Greater => (after, before),
            _ => (before, after),
        };
        trace!("deriving the index between '{before}' and '{after}'");

        let length = before.chars().count().max(after.chars().count());
        let before_pad = padded(before, self.alphabet.start(), length);
        let after_pad = padded(after, self.alphabet.end(), length);

        if before_pad == after_pad {
            warn!(
                "midpoint requested between numerically equal indices \
                 '{before}' and '{after}'"
            );
            return Ok(self.alphabet.midpoint().to_string());
        }

        let mut intermediate = String::new();
        // Once the bounds have separated, the upper bound at every deeper
        // position is the top of the alphabet, exclusive.
        let mut separated = false;
        for (&lower_symbol, &upper_symbol) in before_pad.iter().zip(&after_pad) {
            let lower = self.alphabet.to_ordinal(lower_symbol)?;
            let upper = if separated {
                self.alphabet.len()
            } else {
                self.alphabet.to_ordinal(upper_symbol)?
            };

            if !separated && lower == upper {
                intermediate.push(lower_symbol);
                continue;
            }

            let middle = (lower + upper) / 2;
            if middle != lower {
                intermediate.push(self.alphabet.to_symbol(middle)?);
                return Ok(intermediate);
            }

            // The bounds are adjacent at this position; carry the lower
            // symbol and look for room one position deeper.
            if !separated {
                debug!("'{before}' and '{after}' are adjacent at position {}; extending", intermediate.chars().count());
                separated = true;
            }
            intermediate.push(lower_symbol);
        }

        // The lower bound was flush against the gap at every position.
        intermediate.push(self.alphabet.midpoint());
        Ok(intermediate)
    }

    /// Derive an index that sorts immediately before the given one.
    ///
    /// Decrements the least significant symbol that still has room above
    /// the initial-index symbol (CC -> CB). When every position is
    /// already at that floor, the last symbol is replaced by the lowest
    /// symbol followed by the highest, growing the string to open room
    /// below it (BB -> BAZ).
    pub fn preceding_index(&self, index: &str) -> Result<String, IndexError> {
        self.validate_index(index)?;

        let mut symbols: Vec<char> = index.chars().collect();
        for position in (0..symbols.len()).rev() {
            let ordinal = self.alphabet.to_ordinal(symbols[position])?;
            if ordinal > INITIAL_ORDINAL {
                symbols[position] = self.alphabet.to_symbol(ordinal - 1)?;
                return Ok(symbols.into_iter().collect());
            }
        }

        symbols.pop();
        symbols.push(self.alphabet.start());
        symbols.push(self.alphabet.end());
        Ok(symbols.into_iter().collect())
    }

    /// Derive an index that sorts immediately after the given one.
    ///
    /// Increments the last symbol (C -> D); when the last symbol is
    /// already the top of the alphabet, the initial index is appended
    /// instead (CZ -> CZB).
    pub fn succeeding_index(&self, index: &str) -> Result<String, IndexError> {
        self.validate_index(index)?;

        let mut symbols: Vec<char> = index.chars().collect();
        let last = *symbols.last().ok_or(IndexError::Empty)?;
        if last == self.alphabet.end() {
            symbols.push(self.initial);
        } else {
            let next = self.alphabet.to_symbol(self.alphabet.to_ordinal(last)? + 1)?;
            symbols.pop();
            symbols.push(next);
        }
        Ok(symbols.into_iter().collect())
    }
}

impl Default for Indexer {
    /// An indexer over the A-Z alphabet, whose initial index is "B".
    fn default() -> Self {
        Self {
            alphabet: Alphabet::default(),
            initial: 'B',
        }
    }
}

/// The index's symbols, right-padded with `fill` up to `length`.
fn padded(index: &str, fill: char, length: usize) -> Vec<char> {
    let mut symbols: Vec<char> = index.chars().collect();
    symbols.resize(length, fill);
    symbols
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    fn indexer() -> Indexer {
        Indexer::default()
    }

    #[test]
    fn initial_index_leaves_room_on_both_sides() {
        assert_eq!(indexer().new_index(), "B");
    }

    #[test]
    fn accepts_well_formed_indices() {
        let indexer = indexer();
        for index in ["B", "Z", "AZ", "CQX", "BAB"] {
            assert_eq!(indexer.validate_index(index), Ok(()), "{index}");
        }
    }

    #[test]
    fn rejects_empty_index() {
        assert_eq!(indexer().validate_index(""), Err(IndexError::Empty));
    }

    #[test]
    fn rejects_symbols_outside_the_alphabet() {
        assert_eq!(
            indexer().validate_index("B1"),
            Err(IndexError::UnknownSymbol {
                index: "B1".to_owned(),
                symbol: '1',
            })
        );
        assert_eq!(
            indexer().validate_index("b"),
            Err(IndexError::UnknownSymbol {
                index: "b".to_owned(),
                symbol: 'b',
            })
        );
    }

    #[test]
    fn rejects_trailing_start_symbol() {
        assert_eq!(
            indexer().validate_index("BA"),
            Err(IndexError::TrailingStart {
                index: "BA".to_owned(),
                start: 'A',
            })
        );
    }

    #[test]
    fn midpoint_of_adjacent_symbols_extends() {
        assert_eq!(indexer().midpoint_index("B", "C"), Ok("BN".to_owned()));
    }

    #[test]
    fn midpoint_of_separated_symbols_splits_in_place() {
        assert_eq!(indexer().midpoint_index("B", "D"), Ok("C".to_owned()));
    }

    #[test]
    fn midpoint_ignores_argument_order() {
        let indexer = indexer();
        assert_eq!(indexer.midpoint_index("D", "B"), Ok("C".to_owned()));
        assert_eq!(
            indexer.midpoint_index("B", "C"),
            indexer.midpoint_index("C", "B")
        );
    }

    #[test]
    fn midpoint_of_unequal_lengths_splits_the_suffix() {
        assert_eq!(indexer().midpoint_index("B", "BN"), Ok("BG".to_owned()));
    }

    #[test]
    fn midpoint_descends_past_the_lower_bounds_suffix() {
        // The gap between BZ and C only opens up below position 1, so
        // the result has to carry the Z before it can split.
        let indexer = indexer();
        assert_eq!(indexer.midpoint_index("BZ", "C"), Ok("BZN".to_owned()));
        assert_eq!(indexer.midpoint_index("BZZ", "C"), Ok("BZZN".to_owned()));
        assert_eq!(indexer.midpoint_index("BY", "C"), Ok("BZ".to_owned()));
    }

    #[test]
    fn midpoint_of_equal_indices_falls_back_to_the_alphabet_midpoint() {
        assert_eq!(indexer().midpoint_index("C", "C"), Ok("N".to_owned()));
    }

    #[test]
    fn midpoint_rejects_malformed_bounds() {
        let indexer = indexer();
        assert!(indexer.midpoint_index("BA", "C").is_err());
        assert!(indexer.midpoint_index("B", "").is_err());
    }

    #[test]
    fn preceding_decrements_the_rightmost_symbol_with_room() {
        assert_eq!(indexer().preceding_index("CC"), Ok("CB".to_owned()));
    }

    #[test]
    fn preceding_skips_symbols_already_at_the_floor() {
        assert_eq!(indexer().preceding_index("CAB"), Ok("BAB".to_owned()));
    }

    #[test]
    fn preceding_grows_when_flush_with_the_floor() {
        let indexer = indexer();
        assert_eq!(indexer.preceding_index("BB"), Ok("BAZ".to_owned()));
        assert_eq!(indexer.preceding_index("B"), Ok("AZ".to_owned()));
    }

    #[test]
    fn succeeding_increments_the_last_symbol() {
        assert_eq!(indexer().succeeding_index("C"), Ok("D".to_owned()));
    }

    #[test]
    fn succeeding_grows_past_the_ceiling() {
        assert_eq!(indexer().succeeding_index("CZ"), Ok("CZB".to_owned()));
    }

    #[test]
    fn neighbor_derivation_rejects_malformed_input() {
        let indexer = indexer();
        assert!(indexer.preceding_index("").is_err());
        assert!(indexer.succeeding_index("B1").is_err());
    }

    #[test]
    fn comparison_reads_missing_positions_as_the_lowest_symbol() {
        let indexer = indexer();
        assert_eq!(indexer.compare_indices("B", "BC"), Ok(Ordering::Less));
        assert_eq!(indexer.compare_indices("BC", "B"), Ok(Ordering::Greater));
        assert_eq!(indexer.compare_indices("B", "B"), Ok(Ordering::Equal));
    }

    #[test]
    fn custom_alphabets_compare_by_ordinal_not_char() {
        let alphabet = Alphabet::new("ZYX".chars()).unwrap();
        let indexer = Indexer::new(alphabet).unwrap();
        assert_eq!(indexer.new_index(), "Y");
        // 'Y' precedes 'X' in this alphabet even though 'X' < 'Y' as chars.
        assert_eq!(indexer.compare_indices("Y", "X"), Ok(Ordering::Less));
        assert_eq!(indexer.midpoint_index("Y", "X"), Ok("YY".to_owned()));
    }

    #[test]
    fn single_symbol_alphabets_are_rejected() {
        let alphabet = Alphabet::new(['A']).unwrap();
        assert_eq!(
            Indexer::new(alphabet).unwrap_err(),
            IndexError::AlphabetTooSmall { len: 1 }
        );
    }
}
