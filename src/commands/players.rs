//! Player and guardian commands

use super::common::{or_dash, CommandContext};
use crate::{
    cli::{GuardianCmd, PlayerCmd},
    storage::{NewGuardian, NewPlayer, Player, PlayerGuardian, PlayerUpdate, Registration},
    Result,
};
use serde::Serialize;

/// A player with everything linked to them, for `player show`.
#[derive(Debug, Serialize)]
pub struct PlayerDetails {
    #[serde(flatten)]
    pub player: Player,
    pub guardians: Vec<PlayerGuardian>,
    pub registrations: Vec<Registration>,
}

fn print_players(players: &[Player]) {
    if players.is_empty() {
        println!("No players found");
        return;
    }
    println!("{:>5}  {:<28} {:<10} {:<28} {}", "ID", "Name", "Born", "Email", "Phone");
    for p in players {
        println!(
            "{:>5}  {:<28} {:<10} {:<28} {}",
            p.id,
            p.full_name(),
            or_dash(p.date_of_birth),
            or_dash(p.email.as_deref()),
            or_dash(p.phone.as_deref()),
        );
    }
}

fn print_guardians(guardians: &[PlayerGuardian]) {
    if guardians.is_empty() {
        println!("No guardians recorded");
        return;
    }
    for link in guardians {
        println!(
            "{:>5}  {}{} ({}) {} {}",
            link.guardian.id,
            link.guardian.full_name,
            if link.is_primary { " [primary]" } else { "" },
            or_dash(link.relationship.as_deref()),
            or_dash(link.guardian.email.as_deref()),
            or_dash(link.guardian.phone.as_deref()),
        );
    }
}

/// Handle the `player` command group
pub fn handle_player(ctx: &mut CommandContext, cmd: PlayerCmd) -> Result<()> {
    match cmd {
        PlayerCmd::Add {
            first_name,
            last_name,
            dob,
            email,
            phone,
            notes,
        } => {
            let player = ctx.db.add_player(&NewPlayer {
                first_name,
                last_name,
                date_of_birth: dob,
                email,
                phone,
                notes,
            })?;
            ctx.emit(&player, |p| println!("✓ Added player {} ({})", p.full_name(), p.id))
        }

        PlayerCmd::List { search } => {
            let players = ctx.db.list_players(search.as_deref())?;
            ctx.emit(&players, |p| print_players(p))
        }

        PlayerCmd::Show { id } => {
            let details = PlayerDetails {
                player: ctx.db.get_player(id)?,
                guardians: ctx.db.guardians_for_player(id)?,
                registrations: ctx.db.registrations_for_player(id)?,
            };
            ctx.emit(&details, |d| {
                println!("{} ({})", d.player.full_name(), d.player.id);
                println!("  Born:  {}", or_dash(d.player.date_of_birth));
                println!("  Email: {}", or_dash(d.player.email.as_deref()));
                println!("  Phone: {}", or_dash(d.player.phone.as_deref()));
                println!("  Photo: {}", or_dash(d.player.photo_path.as_deref()));
                if let Some(notes) = &d.player.notes {
                    println!("  Notes: {}", notes);
                }
                println!("Guardians:");
                print_guardians(&d.guardians);
                println!("Registrations:");
                for r in &d.registrations {
                    println!("  {} ({})", r.term_name, r.status);
                }
            })
        }

        PlayerCmd::Update {
            id,
            first_name,
            last_name,
            dob,
            email,
            phone,
            notes,
        } => {
            let player = ctx.db.update_player(
                id,
                &PlayerUpdate {
                    first_name,
                    last_name,
                    date_of_birth: dob,
                    email,
                    phone,
                    notes,
                },
            )?;
            ctx.emit(&player, |p| println!("✓ Updated {} ({})", p.full_name(), p.id))
        }

        PlayerCmd::Remove { id } => {
            let player = ctx.db.get_player(id)?;
            ctx.db.remove_player(id)?;
            ctx.emit(&player, |p| println!("✓ Removed {} ({})", p.full_name(), p.id))
        }

        PlayerCmd::Photo { id, path } => {
            let player = ctx.db.set_player_photo(id, &path)?;
            ctx.emit(&player, |p| {
                println!("✓ Photo for {} stored at {}", p.full_name(), or_dash(p.photo_path.as_deref()))
            })
        }
    }
}

/// Handle the `guardian` command group
pub fn handle_guardian(ctx: &mut CommandContext, cmd: GuardianCmd) -> Result<()> {
    match cmd {
        GuardianCmd::Add {
            player,
            full_name,
            email,
            phone,
            relationship,
            primary,
        } => {
            let guardian = ctx.db.add_guardian(
                player,
                &NewGuardian {
                    full_name,
                    email,
                    phone,
                },
                relationship.as_deref(),
                primary,
            )?;
            ctx.emit(&guardian, |g| {
                println!("✓ Added guardian {} ({}) for player {}", g.full_name, g.id, player)
            })
        }

        GuardianCmd::Link {
            player,
            guardian,
            relationship,
            primary,
        } => {
            ctx.db
                .link_guardian(player, guardian, relationship.as_deref(), primary)?;
            let guardians = ctx.db.guardians_for_player(player)?;
            ctx.emit(&guardians, |g| {
                println!("✓ Linked guardian {} to player {}", guardian, player);
                print_guardians(g);
            })
        }

        GuardianCmd::List { player } => {
            let guardians = ctx.db.guardians_for_player(player)?;
            ctx.emit(&guardians, |g| print_guardians(g))
        }
    }
}
