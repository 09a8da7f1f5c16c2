//! Round randomization: spy selection and location draw.
//!
//! Pure with respect to the room; the state machine applies the results.
//! Thread-local `rand` is fair enough for a party game and is not derivable
//! from player-visible state.

use rand::Rng;

/// Pick the spy: a uniform index into the player list.
pub fn pick_spy(player_count: usize) -> usize {
    debug_assert!(player_count > 0);
    rand::rng().random_range(0..player_count)
}

/// Draw one location uniformly from the catalog.
pub fn pick_location(catalog: &[&str]) -> String {
    debug_assert!(!catalog.is_empty());
    let idx = rand::rng().random_range(0..catalog.len());
    catalog[idx].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn spy_index_is_in_bounds() {
        for _ in 0..1000 {
            assert!(pick_spy(5) < 5);
        }
    }

    #[test]
    fn every_player_can_be_picked() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            seen.insert(pick_spy(3));
        }
        assert_eq!(seen, HashSet::from([0, 1, 2]));
    }

    #[test]
    fn location_comes_from_catalog() {
        let catalog = ["Beach", "Casino", "Submarine"];
        for _ in 0..100 {
            let word = pick_location(&catalog);
            assert!(catalog.contains(&word.as_str()));
        }
    }
}
