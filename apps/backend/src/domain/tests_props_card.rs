//! Property tests for punch sets (pure domain, no DB).

use proptest::prelude::*;

use crate::domain::card::{Punch, PunchOutcome, Seed, CARD_SIZE};

fn full_seed() -> Seed {
    let cells: Vec<String> = (0..CARD_SIZE).map(|c| c.to_string()).collect();
    Seed::decode(&format!("[{}]", cells.join(",")))
}

proptest! {
    /// Property: punch only grows, never holds duplicates, stays inside the seed
    #[test]
    fn prop_punch_grows_monotonically(indices in prop::collection::vec(0usize..40, 0..60)) {
        let seed = full_seed();
        let mut punch = Punch::new();
        for index in indices {
            let before = punch.len();
            let outcome = punch.punch(&seed, index);
            match outcome {
                PunchOutcome::Punched => prop_assert_eq!(punch.len(), before + 1),
                PunchOutcome::AlreadyPunched | PunchOutcome::OutOfRange => {
                    prop_assert_eq!(punch.len(), before)
                }
                PunchOutcome::CardMissing => prop_assert!(false, "pure punch never reports a missing card"),
            }
        }
        prop_assert!(punch.iter().all(|i| i < CARD_SIZE));

        let decoded = Punch::decode(&punch.encode());
        prop_assert_eq!(decoded, punch);
    }

    /// Property: decoding arbitrary text never panics
    #[test]
    fn prop_decode_is_total(raw in ".*") {
        let punch = Punch::decode(&raw);
        let reencoded = Punch::decode(&punch.encode());
        prop_assert_eq!(reencoded, punch);
    }
}
