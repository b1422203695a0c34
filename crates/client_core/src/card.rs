//! Renderable card for one comparison.

use shared::domain::{Candidate, CandidateId, Pair, Side};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub u64);

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "card-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateView {
    pub id: CandidateId,
    pub label: String,
    pub media_url: String,
}

/// One installed comparison. Surfaces bind pointer and touch input to a card
/// by addressing it with [`CardId`]; the session drops input for any id but
/// the current one, so a replaced card keeps no live bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    id: CardId,
    pair: Pair,
    left: CandidateView,
    right: CandidateView,
}

impl Card {
    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn pair(&self) -> &Pair {
        &self.pair
    }

    pub fn view(&self, side: Side) -> &CandidateView {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Input addressed to any other card instance is stale.
    pub fn accepts(&self, target: CardId) -> bool {
        self.id == target
    }
}

#[derive(Debug, Clone)]
pub struct CardBuilder {
    media_base: Option<Url>,
    next_id: u64,
}

impl CardBuilder {
    /// `media_base` is the vote server; media references resolve to
    /// `<base>/media/<file>`. Without a base the URL stays server-relative.
    pub fn new(media_base: Option<Url>) -> Self {
        Self {
            media_base,
            next_id: 1,
        }
    }

    pub fn build(&mut self, pair: Pair) -> Card {
        let id = CardId(self.next_id);
        self.next_id += 1;
        let left = self.view(&pair.left);
        let right = self.view(&pair.right);
        Card {
            id,
            pair,
            left,
            right,
        }
    }

    fn view(&self, candidate: &Candidate) -> CandidateView {
        CandidateView {
            id: candidate.id,
            label: candidate.name.clone(),
            media_url: self.media_url(&candidate.media),
        }
    }

    fn media_url(&self, file: &str) -> String {
        let relative = format!("/media/{}", file.trim_start_matches('/'));
        match &self.media_base {
            Some(base) => base
                .join(&relative)
                .map(String::from)
                .unwrap_or(relative),
            None => relative,
        }
    }
}
