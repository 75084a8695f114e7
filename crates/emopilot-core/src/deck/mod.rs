mod builder;
mod card;
pub mod pools;

pub use builder::{BuiltDeck, DeckBuilder, MAX_CARD_COUNT, MIN_CARD_COUNT};
pub use card::{Card, EmotionZone, Location, SuggestedResponse};
