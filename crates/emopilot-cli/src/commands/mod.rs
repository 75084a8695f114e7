pub mod cards;
pub mod config;
pub mod deck;
pub mod mission;
pub mod xp;
