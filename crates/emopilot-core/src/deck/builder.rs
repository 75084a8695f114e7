//! Deck construction.
//!
//! A deck holds `count - 1` regular cards balanced between happy and unhappy
//! scenarios, plus exactly one boss card, in a uniformly shuffled order.
//!
//! When the pool cannot supply enough regular cards the deck is clamped to
//! what the pool holds (no card repeats) and a warning is logged. The caller
//! sees both the requested and the effective size in [`BuiltDeck`].

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use super::card::{Card, EmotionZone, Location};
use super::pools;
use crate::error::DeckError;

pub const MIN_CARD_COUNT: u32 = 1;
pub const MAX_CARD_COUNT: u32 = 15;

/// Result of a deck build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltDeck {
    pub cards: Vec<Card>,
    /// Count asked for, after clamping to the supported range.
    pub requested: u32,
    /// Count actually delivered.
    pub effective: u32,
}

impl BuiltDeck {
    pub fn is_short(&self) -> bool {
        self.effective < self.requested
    }
}

#[derive(Debug, Clone)]
pub struct DeckBuilder {
    pool: Vec<Card>,
    bosses: Vec<Card>,
}

impl DeckBuilder {
    pub fn new(pool: Vec<Card>, bosses: Vec<Card>) -> Self {
        Self { pool, bosses }
    }

    /// Builder over the built-in pool for `location` and the built-in bosses.
    pub fn for_location(location: Location) -> Self {
        Self::new(pools::pool_for(location), pools::boss_cards())
    }

    pub fn clamp_count(count: u32) -> u32 {
        count.clamp(MIN_CARD_COUNT, MAX_CARD_COUNT)
    }

    /// Build a shuffled deck of `count` cards.
    ///
    /// # Errors
    /// Returns [`DeckError::EmptyBossPool`] when there is no boss to include.
    pub fn build<R: Rng + ?Sized>(&self, count: u32, rng: &mut R) -> Result<BuiltDeck, DeckError> {
        let requested = Self::clamp_count(count);
        let boss = self
            .bosses
            .choose(rng)
            .cloned()
            .ok_or(DeckError::EmptyBossPool)?;

        if requested == 1 {
            return Ok(BuiltDeck {
                cards: vec![boss],
                requested,
                effective: 1,
            });
        }

        let wanted = (requested - 1) as usize;
        let mut regulars = self.pick_regulars(wanted, rng);
        if regulars.len() < wanted {
            tracing::warn!(
                requested,
                available = regulars.len(),
                "card pool too small, clamping deck size"
            );
        }

        regulars.push(boss);
        regulars.shuffle(rng);
        let effective = regulars.len() as u32;
        Ok(BuiltDeck {
            cards: regulars,
            requested,
            effective,
        })
    }

    /// Take up to `wanted` non-boss cards, half happy and half unhappy, topping
    /// up from the other side when one side runs short.
    fn pick_regulars<R: Rng + ?Sized>(&self, wanted: usize, rng: &mut R) -> Vec<Card> {
        let (mut happy, mut unhappy): (Vec<Card>, Vec<Card>) = self
            .pool
            .iter()
            .filter(|c| !c.is_boss)
            .cloned()
            .partition(|c| c.zone == EmotionZone::Happy);
        happy.shuffle(rng);
        unhappy.shuffle(rng);

        let happy_target = wanted.div_ceil(2);
        let unhappy_target = wanted / 2;

        let happy_take = happy_target.min(happy.len());
        let unhappy_take = unhappy_target.min(unhappy.len());
        let happy_extra = (unhappy_target - unhappy_take).min(happy.len() - happy_take);
        let unhappy_extra = (happy_target - happy_take).min(unhappy.len() - unhappy_take);

        happy.truncate(happy_take + happy_extra);
        unhappy.truncate(unhappy_take + unhappy_extra);
        happy.extend(unhappy);
        happy
    }
}
