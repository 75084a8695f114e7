use std::collections::HashSet;

use emopilot_core::deck::{pools, MAX_CARD_COUNT};
use emopilot_core::{DeckBuilder, EmotionZone, Location};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;

fn location() -> impl Strategy<Value = Location> {
    prop_oneof![
        Just(Location::School),
        Just(Location::Home),
        Just(Location::Playground),
    ]
}

proptest! {
    #[test]
    fn deck_has_requested_size_and_one_boss(
        count in 2u32..=MAX_CARD_COUNT,
        location in location(),
        seed in any::<u64>(),
    ) {
        let mut rng = Mcg128Xsl64::seed_from_u64(seed);
        let deck = DeckBuilder::for_location(location).build(count, &mut rng).unwrap();
        prop_assert_eq!(deck.cards.len() as u32, count);
        prop_assert_eq!(deck.cards.iter().filter(|c| c.is_boss).count(), 1);
        prop_assert!(!deck.is_short());
    }

    #[test]
    fn deck_never_repeats_a_card(
        count in 1u32..=40,
        location in location(),
        seed in any::<u64>(),
    ) {
        let mut rng = Mcg128Xsl64::seed_from_u64(seed);
        let deck = DeckBuilder::for_location(location).build(count, &mut rng).unwrap();
        let ids: HashSet<_> = deck.cards.iter().map(|c| c.id.as_str()).collect();
        prop_assert_eq!(ids.len(), deck.cards.len());
    }

    #[test]
    fn regular_cards_split_evenly(
        count in 2u32..=MAX_CARD_COUNT,
        location in location(),
        seed in any::<u64>(),
    ) {
        let mut rng = Mcg128Xsl64::seed_from_u64(seed);
        let deck = DeckBuilder::for_location(location).build(count, &mut rng).unwrap();
        let regular = (count - 1) as usize;
        let happy = deck
            .cards
            .iter()
            .filter(|c| !c.is_boss && c.zone == EmotionZone::Happy)
            .count();
        prop_assert_eq!(happy, regular.div_ceil(2));
        prop_assert_eq!(regular - happy, regular / 2);
    }

    #[test]
    fn same_seed_same_deck(seed in any::<u64>(), location in location()) {
        let builder = DeckBuilder::for_location(location);
        let a = builder.build(8, &mut Mcg128Xsl64::seed_from_u64(seed)).unwrap();
        let b = builder.build(8, &mut Mcg128Xsl64::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(a.cards, b.cards);
    }
}

#[test]
fn bosses_come_from_boss_pool() {
    let boss_ids: HashSet<_> = pools::boss_cards().into_iter().map(|c| c.id).collect();
    for seed in 0..50 {
        let deck = DeckBuilder::for_location(Location::Home)
            .build(5, &mut Mcg128Xsl64::seed_from_u64(seed))
            .unwrap();
        let boss = deck.cards.iter().find(|c| c.is_boss).unwrap();
        assert!(boss_ids.contains(&boss.id));
    }
}
