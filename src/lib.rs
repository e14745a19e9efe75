//! Lexicographic fractional indexing over a configurable alphabet.
//!
//! Items in a mutable ordered collection (the cards in a Kanban column,
//! say) are given string sort keys such that a new key can always be
//! generated between two existing ones without rewriting anything already
//! stored. Keys are strings over a fixed alphabet (A-Z by default),
//! compared lexicographically, and grow one character deeper whenever the
//! gap between two neighbors runs out of room at the current length.
//!
//! ```
//! use fractional_indexing::Indexer;
//!
//! let indexer = Indexer::default();
//! let first = indexer.new_index();
//! assert_eq!(first, "B");
//!
//! let second = indexer.succeeding_index(&first)?;
//! let between = indexer.midpoint_index(&first, &second)?;
//! assert!(first < between && between < second);
//! # Ok::<(), fractional_indexing::IndexError>(())
//! ```

pub mod alphabet;
pub mod indexer;

pub use alphabet::{Alphabet, AlphabetError};
pub use indexer::{IndexError, Indexer};
