use clap::Subcommand;
use emopilot_core::{Config, DeckBuilder, Location};
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;

#[derive(Subcommand)]
pub enum DeckAction {
    /// Deal a deck without playing it
    Build {
        /// Scenario location (school, home, playground)
        #[arg(long)]
        location: Location,
        /// Deck size; defaults to the configured mission size
        #[arg(long)]
        count: Option<u32>,
        /// Seed for a reproducible shuffle
        #[arg(long)]
        seed: Option<u64>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: DeckAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DeckAction::Build {
            location,
            count,
            seed,
            json,
        } => {
            let count = match count {
                Some(count) => count,
                None => Config::load()?.mission.card_count,
            };
            let mut rng = match seed {
                Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
                None => Mcg128Xsl64::from_entropy(),
            };
            let deck = DeckBuilder::for_location(location).build(count, &mut rng)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&deck)?);
                return Ok(());
            }
            for (i, card) in deck.cards.iter().enumerate() {
                let boss = if card.is_boss { " [boss]" } else { "" };
                println!("{:>2}. {:<8} {}{boss}", i + 1, card.zone, card.label);
            }
            if deck.is_short() {
                eprintln!(
                    "note: pool only had room for {} of {} cards",
                    deck.effective, deck.requested
                );
            }
        }
    }
    Ok(())
}
