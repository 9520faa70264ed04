//! Bingo card values: the shuffled `seed` and the growing `punch` set.
//!
//! Both are persisted as JSON integer arrays. Decoding is lenient: a stored
//! value that cannot be read is treated as empty rather than failing the
//! caller, since losing a historical mark beats halting scoring.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

/// Number of cells on a card.
pub const CARD_SIZE: usize = 25;

/// Result of trying to mark one cell on one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunchOutcome {
    /// Index was added.
    Punched,
    /// Index was already present; card left unchanged.
    AlreadyPunched,
    /// Index is outside the card's seed; card left unchanged.
    OutOfRange,
    /// No card row with that id.
    CardMissing,
}

/// Maps a question to the card cell it punches.
///
/// Cells are bound to a dense, 1-based question id space: question `n`
/// punches zero-based index `n - 1`. Ids below 1 have no cell. Ids past the
/// card size map to an index the seed does not contain, and callers must
/// treat that as out of range rather than punching it.
pub fn punch_index_for_question(question_id: i64) -> Option<usize> {
    if question_id < 1 {
        return None;
    }
    usize::try_from(question_id - 1).ok()
}

/// Set of marked indices, kept sorted and unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Punch(BTreeSet<usize>);

impl Punch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lenient decode: malformed JSON yields an empty set and negative or
    /// non-integer entries are skipped.
    pub fn decode(raw: &str) -> Self {
        Self(decode_indices(raw).into_iter().collect())
    }

    /// Sorted JSON array, no duplicates.
    pub fn encode(&self) -> String {
        encode_indices(self.0.iter().copied())
    }

    /// Returns `true` when the index was newly inserted.
    pub fn insert(&mut self, index: usize) -> bool {
        self.0.insert(index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Add `index` if `seed` contains it.
    pub fn punch(&mut self, seed: &Seed, index: usize) -> PunchOutcome {
        if !seed.contains(index) {
            return PunchOutcome::OutOfRange;
        }
        if self.insert(index) {
            PunchOutcome::Punched
        } else {
            PunchOutcome::AlreadyPunched
        }
    }
}

impl FromIterator<usize> for Punch {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Permutation of `0..CARD_SIZE` fixing a card's board layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed(Vec<usize>);

impl Seed {
    /// Fresh Fisher-Yates shuffle of `0..CARD_SIZE`.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cells: Vec<usize> = (0..CARD_SIZE).collect();
        cells.shuffle(rng);
        Self(cells)
    }

    /// Lenient decode, keeping stored order.
    pub fn decode(raw: &str) -> Self {
        Self(decode_indices(raw))
    }

    pub fn encode(&self) -> String {
        encode_indices(self.0.iter().copied())
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn cells(&self) -> &[usize] {
        &self.0
    }
}

fn decode_indices(raw: &str) -> Vec<usize> {
    match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(values) => values
            .iter()
            .filter_map(|v| v.as_u64())
            .filter_map(|v| usize::try_from(v).ok())
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn encode_indices(indices: impl Iterator<Item = usize>) -> String {
    let values: Vec<usize> = indices.collect();
    serde_json::to_string(&values).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn index_is_question_id_minus_one() {
        assert_eq!(punch_index_for_question(1), Some(0));
        assert_eq!(punch_index_for_question(3), Some(2));
        assert_eq!(punch_index_for_question(0), None);
        assert_eq!(punch_index_for_question(-4), None);
    }

    #[test]
    fn malformed_punch_decodes_empty() {
        assert!(Punch::decode("not json").is_empty());
        assert!(Punch::decode("").is_empty());
        assert!(Punch::decode("{\"a\":1}").is_empty());
    }

    #[test]
    fn punch_skips_bad_entries_and_dedups() {
        let punch = Punch::decode("[4, -1, \"x\", 2, 4, 1.5]");
        assert_eq!(punch.iter().collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(punch.encode(), "[2,4]");
    }

    #[test]
    fn punching_twice_is_idempotent() {
        let seed = Seed::decode("[0,1,2,3]");
        let mut punch = Punch::new();
        assert_eq!(punch.punch(&seed, 2), PunchOutcome::Punched);
        assert_eq!(punch.punch(&seed, 2), PunchOutcome::AlreadyPunched);
        assert_eq!(punch.encode(), "[2]");
    }

    #[test]
    fn punching_outside_seed_is_refused() {
        let seed = Seed::decode("[0,1,2]");
        let mut punch = Punch::new();
        assert_eq!(punch.punch(&seed, 30), PunchOutcome::OutOfRange);
        assert!(punch.is_empty());
    }

    #[test]
    fn shuffled_seed_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let seed = Seed::shuffled(&mut rng);
        let mut cells = seed.cells().to_vec();
        cells.sort_unstable();
        assert_eq!(cells, (0..CARD_SIZE).collect::<Vec<_>>());
        assert_eq!(Seed::decode(&seed.encode()), seed);
    }
}
