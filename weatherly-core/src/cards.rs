//! Ordered, deduplicated list of weather cards.
//!
//! The list is a plain value: both transforms consume it and hand back the
//! next version, so whoever owns the list decides when to swap it in.

use serde::Serialize;

use crate::model::WeatherSnapshot;

/// Snapshots ordered newest-first, unique by `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CardList {
    cards: Vec<WeatherSnapshot>,
}

impl CardList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `snapshot` in front unless a card with the same id already exists,
    /// in which case the list comes back untouched.
    pub fn prepend_if_absent(self, snapshot: WeatherSnapshot) -> Self {
        if self.contains(snapshot.id) {
            return self;
        }

        let mut cards = Vec::with_capacity(self.cards.len() + 1);
        cards.push(snapshot);
        cards.extend(self.cards);
        Self { cards }
    }

    /// Drop the card with `id`, keeping the others in order. Unknown ids are a no-op.
    pub fn remove_by_id(mut self, id: u64) -> Self {
        self.cards.retain(|card| card.id != id);
        self
    }

    pub fn contains(&self, id: u64) -> bool {
        self.cards.iter().any(|card| card.id == id)
    }

    pub fn get(&self, id: u64) -> Option<&WeatherSnapshot> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WeatherSnapshot> {
        self.cards.iter()
    }

    pub fn as_slice(&self) -> &[WeatherSnapshot] {
        &self.cards
    }
}

impl<'a> IntoIterator for &'a CardList {
    type Item = &'a WeatherSnapshot;
    type IntoIter = std::slice::Iter<'a, WeatherSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}
