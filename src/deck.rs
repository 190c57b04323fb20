use std::collections::HashMap;

use once_cell::sync::Lazy;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::Deserialize;

use crate::prompt_type::PromptType;

const BUILTIN_DECK: &str = include_str!("../decks/example_prompts.json");

static DECK: Lazy<ExampleDeck> =
    Lazy::new(|| serde_json::from_str(BUILTIN_DECK).expect("builtin deck is valid JSON"));

/// A static catalog of curated prompt strings, optionally categorized by
/// prompt style. Read-only at runtime; callers draw from shuffled copies.
#[derive(Clone, Debug, Deserialize)]
pub struct ExampleDeck {
    prompts: Vec<String>,
    #[serde(default)]
    by_type: HashMap<PromptType, Vec<String>>,
}

impl ExampleDeck {
    /// The deck compiled into the binary.
    pub fn builtin() -> &'static ExampleDeck {
        &DECK
    }

    pub fn new(prompts: Vec<String>) -> Self {
        Self {
            prompts,
            by_type: HashMap::new(),
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Prompts curated for one style; the full deck when the style has no
    /// dedicated sub-list.
    pub fn for_type(&self, kind: PromptType) -> &[String] {
        self.by_type
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&self.prompts)
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// A freshly shuffled working copy of the full deck.
    pub fn shuffled(&self, rng: &mut impl Rng) -> Vec<String> {
        let mut copy = self.prompts.clone();
        copy.shuffle(rng);
        copy
    }

    /// A uniform draw from the full deck.
    pub fn random(&self, rng: &mut impl Rng) -> Option<&str> {
        self.prompts.choose(rng).map(String::as_str)
    }

    /// Up to `count` distinct prompts from a fresh shuffle, for few-shot
    /// context.
    pub fn sample(&self, rng: &mut impl Rng, count: usize) -> Vec<String> {
        let mut copy = self.shuffled(rng);
        copy.truncate(count);
        copy
    }
}
