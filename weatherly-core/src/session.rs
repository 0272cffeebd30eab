//! UI-side state for a run of lookups: the cards on screen, whether a lookup
//! is in flight, and the last error message.

use tracing::{debug, info};

use crate::{
    cards::CardList,
    error::FetchError,
    geolocation::PositionSource,
    model::{LocationQuery, WeatherSnapshot},
    provider::WeatherProvider,
};

#[derive(Debug, Default)]
pub struct LookupSession {
    cards: CardList,
    loading: bool,
    error: Option<String>,
}

impl LookupSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self) -> &CardList {
        &self.cards
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Mark a lookup as started.
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Fold a finished lookup into the session. A failure only sets the
    /// message; the cards are left as they are.
    pub fn apply(&mut self, outcome: Result<WeatherSnapshot, FetchError>) {
        self.loading = false;
        match outcome {
            Ok(snapshot) => {
                let id = snapshot.id;
                let cards = std::mem::take(&mut self.cards);
                self.cards = cards.prepend_if_absent(snapshot);
                debug!(id, cards = self.cards.len(), "applied lookup");
            }
            Err(err) => {
                info!(error = %err, "lookup failed");
                self.error = Some(err.to_string());
            }
        }
    }

    /// Remove the card with `id`, if shown.
    pub fn dismiss(&mut self, id: u64) {
        let cards = std::mem::take(&mut self.cards);
        self.cards = cards.remove_by_id(id);
    }

    /// Look up a city typed by the user. Blank input is reported without
    /// touching the network. Returns whether a card lookup succeeded.
    pub async fn search(&mut self, provider: &dyn WeatherProvider, input: &str) -> bool {
        let query = match LocationQuery::city(input) {
            Ok(query) => query,
            Err(err) => {
                self.error = Some(err.to_string());
                return false;
            }
        };

        self.run(provider, &query).await
    }

    /// Look up the weather at the current position.
    pub async fn locate(
        &mut self,
        provider: &dyn WeatherProvider,
        positions: &dyn PositionSource,
    ) -> bool {
        self.begin();
        match positions.current_position().await {
            Ok(position) => self.run(provider, &LocationQuery::coordinates(position)).await,
            Err(err) => {
                self.apply(Err(err));
                false
            }
        }
    }

    async fn run(&mut self, provider: &dyn WeatherProvider, query: &LocationQuery) -> bool {
        self.begin();
        let outcome = provider.fetch(query).await;
        let ok = outcome.is_ok();
        self.apply(outcome);
        ok
    }
}
