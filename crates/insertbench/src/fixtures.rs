//! Synthetic row generation.
//!
//! Each benchmark row is a phrase of random English words plus a v4 UUID.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::backend::TABLE_NAME;

/// Fewest words in a phrase.
pub const MIN_WORDS: usize = 3;

/// Most words in a phrase.
pub const MAX_WORDS: usize = 15;

/// Vocabulary phrases are drawn from.
const WORDS: &[&str] = &[
    "able", "acid", "actor", "adult", "afternoon", "agent", "airport", "alarm", "album", "amber",
    "angle", "animal", "answer", "apple", "arch", "arrow", "artist", "autumn", "avenue", "badge",
    "baker", "balance", "bamboo", "banner", "barrel", "basket", "battery", "beach", "beacon",
    "bicycle", "blanket", "blossom", "border", "bottle", "branch", "breeze", "bridge", "bright",
    "bronze", "bubble", "bucket", "button", "cabin", "cactus", "camera", "candle", "canyon",
    "carbon", "carpet", "castle", "cattle", "ceiling", "channel", "chapter", "cherry", "circle",
    "citizen", "clever", "cliff", "clock", "cloud", "coast", "coffee", "copper", "coral", "cotton",
    "crystal", "curtain", "dancer", "dawn", "desert", "diamond", "dinner", "distant", "dragon",
    "drift", "eager", "eagle", "echo", "electric", "elegant", "empire", "engine", "evening",
    "fabric", "falcon", "feather", "fence", "festival", "field", "flame", "forest", "fountain",
    "fragile", "frozen", "galaxy", "garden", "gentle", "giant", "glacier", "golden", "granite",
    "gravity", "harbor", "harvest", "hazel", "helmet", "hidden", "hollow", "honest", "horizon",
    "humble", "island", "ivory", "jacket", "jungle", "kettle", "kingdom", "ladder", "lantern",
    "lemon", "library", "lively", "lunar", "magnet", "maple", "marble", "meadow", "melody",
    "mirror", "modest", "morning", "mountain", "narrow", "needle", "noble", "ocean", "orange",
    "orbit", "orchard", "paddle", "palace", "paper", "pebble", "pepper", "pillow", "planet",
    "pocket", "polite", "prairie", "puzzle", "quiet", "rabbit", "radiant", "rapid", "raven",
    "ribbon", "river", "rocket", "rustic", "saddle", "salmon", "scarlet", "shadow", "shallow",
    "silver", "simple", "slender", "spiral", "spring", "stable", "steady", "stone", "summer",
    "sunset", "swift", "tablet", "temple", "thunder", "timber", "tender", "travel", "tunnel",
    "twilight", "umbrella", "valley", "velvet", "violet", "voyage", "wander", "window", "winter",
    "wisdom", "wooden", "yellow", "zephyr",
];

/// Generates random word phrases.
pub struct PhraseGenerator {
    rng: StdRng,
}

impl PhraseGenerator {
    /// Create a generator seeded from system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a generator with a fixed seed for reproducible phrases.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a phrase of [`MIN_WORDS`] to [`MAX_WORDS`] words separated by spaces.
    pub fn phrase(&mut self) -> String {
        let count = self.rng.gen_range(MIN_WORDS..=MAX_WORDS);
        (0..count)
            .map(|_| WORDS[self.rng.gen_range(0..WORDS.len())])
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for PhraseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the single-row insert for one benchmark row.
///
/// Single quotes in the phrase are doubled.
pub fn insert_statement(phrase: &str, id: &Uuid) -> String {
    format!(
        "INSERT INTO {TABLE_NAME} (teststr,uuid) VALUES('{}', '{}');",
        phrase.replace('\'', "''"),
        id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_word_count_in_range() {
        let mut phrases = PhraseGenerator::seeded(7);
        for _ in 0..500 {
            let phrase = phrases.phrase();
            let words = phrase.split(' ').count();
            assert!((MIN_WORDS..=MAX_WORDS).contains(&words), "{phrase}");
            assert!(phrase.split(' ').all(|w| WORDS.contains(&w)));
        }
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = PhraseGenerator::seeded(42);
        let mut b = PhraseGenerator::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.phrase(), b.phrase());
        }
    }

    #[test]
    fn test_insert_statement_shape() {
        let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(
            insert_statement("quiet river stone", &id),
            "INSERT INTO perf (teststr,uuid) VALUES('quiet river stone', '67e55044-10b1-426f-9247-bb680e5fe0c8');"
        );
    }

    #[test]
    fn test_insert_statement_escapes_quotes() {
        let id = Uuid::nil();
        let sql = insert_statement("it's here", &id);
        assert!(sql.contains("VALUES('it''s here', "));
    }
}
