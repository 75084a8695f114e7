use std::sync::Arc;

use clap::Subcommand;
use emopilot_core::storage::Database;
use emopilot_core::{GlobalAudio, Session, XpStore};

#[derive(Subcommand)]
pub enum XpAction {
    /// Print stored experience points
    Show,
    /// Erase all progress, including experience points
    Reset,
}

pub fn run(action: XpAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        XpAction::Show => {
            let xp = db.load_xp()?.unwrap_or(0);
            println!("{xp}");
        }
        XpAction::Reset => {
            let mut session = Session::new(Box::new(db), Arc::new(GlobalAudio));
            for event in session.reset_all_progress() {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
    }
    Ok(())
}
