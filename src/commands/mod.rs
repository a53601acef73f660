//! Command implementations for the clubhouse CLI

pub mod common;
pub mod events;
pub mod fees;
pub mod players;
pub mod seasons;
pub mod sync;

use crate::{
    cli::{Club, Commands},
    Result,
};
use common::CommandContext;

/// Open the database and run one parsed command against it.
pub async fn run(club: Club) -> Result<()> {
    let mut ctx = CommandContext::open(club.db, club.json)?;
    dispatch(&mut ctx, club.command).await
}

/// Route a command to its handler.
pub async fn dispatch(ctx: &mut CommandContext, command: Commands) -> Result<()> {
    match command {
        Commands::Player { cmd } => players::handle_player(ctx, cmd),
        Commands::Guardian { cmd } => players::handle_guardian(ctx, cmd),
        Commands::Team { cmd } => seasons::handle_team(ctx, cmd),
        Commands::Term { cmd } => seasons::handle_term(ctx, cmd),
        Commands::Register { cmd } => seasons::handle_register(ctx, cmd),
        Commands::Event { cmd } => events::handle_event(ctx, cmd),
        Commands::Roll { cmd } => events::handle_roll(ctx, cmd),
        Commands::Fee { cmd } => fees::handle_fee(ctx, cmd),
        Commands::Sync { cmd } => sync::handle_sync(ctx, cmd).await,
    }
}

#[cfg(test)]
mod tests;
