use clap::Subcommand;
use emopilot_core::deck::pools;
use emopilot_core::stabilize::{EMOTIONS, NEEDS};
use emopilot_core::{Card, Location};

#[derive(Subcommand)]
pub enum CardsAction {
    /// List scenario cards
    List {
        /// Only cards for this location (school, home, playground)
        #[arg(long)]
        location: Option<Location>,
        /// List the boss cards instead
        #[arg(long, conflicts_with = "location")]
        bosses: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the emotions offered in the report step
    Emotions,
    /// List the needs offered in the report step
    Needs,
}

fn print_card(card: &Card) {
    let boss = if card.is_boss { " [boss]" } else { "" };
    println!("{:<4} {:<8} {}{boss}", card.id, card.zone, card.label);
}

pub fn run(action: CardsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CardsAction::List {
            location,
            bosses,
            json,
        } => {
            let cards: Vec<Card> = if bosses {
                pools::boss_cards()
            } else {
                match location {
                    Some(location) => pools::pool_for(location),
                    None => Location::ALL.into_iter().flat_map(pools::pool_for).collect(),
                }
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&cards)?);
            } else {
                cards.iter().for_each(print_card);
            }
        }
        CardsAction::Emotions => {
            for option in EMOTIONS {
                println!("{:<8} {}", option.id, option.label);
            }
        }
        CardsAction::Needs => {
            for option in NEEDS {
                println!("{:<8} {}", option.id, option.label);
            }
        }
    }
    Ok(())
}
