//! Team, term and registration commands

use super::common::{or_dash, CommandContext};
use crate::{
    cli::{types::time::today, RegisterCmd, TeamCmd, TermCmd},
    storage::{Registration, RosterEntry, Team, TeamTerm, Term},
    ClubError, PlayerTermId, RegistrationStatus, Result, Role,
};
use serde::Serialize;

fn print_teams(teams: &[Team]) {
    if teams.is_empty() {
        println!("No teams yet");
        return;
    }
    println!("{:>5}  {:<24} {}", "ID", "Team", "Age group");
    for t in teams {
        println!("{:>5}  {:<24} {}", t.id, t.name, or_dash(t.age_group.as_deref()));
    }
}

fn print_terms(terms: &[Term]) {
    if terms.is_empty() {
        println!("No terms yet");
        return;
    }
    println!("{:>5}  {:<20} {:<10}   {}", "ID", "Term", "Starts", "Ends");
    for t in terms {
        println!("{:>5}  {:<20} {:<10}   {}", t.id, t.name, t.starts_on, t.ends_on);
    }
}

fn print_team_terms(team_terms: &[TeamTerm]) {
    if team_terms.is_empty() {
        println!("No teams enrolled");
        return;
    }
    println!("{:>5}  {:<24} {:>10}  {}", "TT", "Team", "Fee", "Due");
    for tt in team_terms {
        println!(
            "{:>5}  {:<24} {:>10}  {}",
            tt.id,
            tt.team_name,
            tt.fee,
            or_dash(tt.fee_due_on)
        );
    }
}

fn print_roster(roster: &[RosterEntry]) {
    if roster.is_empty() {
        println!("No players assigned");
        return;
    }
    for entry in roster {
        println!(
            "{:>5}  {} {}{} [{}]",
            entry.player_id,
            entry.first_name,
            entry.last_name,
            if entry.role == Role::Captain { " (C)" } else { "" },
            entry.status
        );
    }
}

fn print_registrations(registrations: &[Registration]) {
    if registrations.is_empty() {
        println!("No registrations");
        return;
    }
    println!("{:>5}  {:>6}  {:<28} {}", "Reg", "Player", "Name", "Status");
    for r in registrations {
        println!(
            "{:>5}  {:>6}  {:<28} {}",
            r.player_term_id, r.player_id, r.player_name, r.status
        );
    }
}

/// Handle the `team` command group
pub fn handle_team(ctx: &mut CommandContext, cmd: TeamCmd) -> Result<()> {
    match cmd {
        TeamCmd::Add { name, age_group } => {
            let team = ctx.db.add_team(&name, age_group.as_deref())?;
            ctx.emit(&team, |t| println!("✓ Added team {} ({})", t.name, t.id))
        }

        TeamCmd::List => {
            let teams = ctx.db.list_teams()?;
            ctx.emit(&teams, |t| print_teams(t))
        }

        TeamCmd::Enrol {
            team,
            term,
            fee,
            due,
        } => {
            let team_term = ctx.db.enrol_team(team, term, fee, due)?;
            ctx.emit(&team_term, |tt| {
                println!(
                    "✓ {} enrolled in {} (fee {}, due {})",
                    tt.team_name,
                    tt.term_name,
                    tt.fee,
                    or_dash(tt.fee_due_on)
                )
            })
        }

        TeamCmd::Assign {
            team,
            term,
            players,
            role,
        } => {
            let outcome = ctx.db.assign_players(team, term, &players, role)?;
            ctx.emit(&outcome, |o| {
                println!("✓ Assignment saved");
                println!("  New registrations: {}", o.player_terms_created);
                println!("  Added to team:     {}", o.memberships_added);
                println!("  Role changed:      {}", o.roles_changed);
                println!("  Already on team:   {}", o.unchanged);
            })
        }

        TeamCmd::Unassign { team, term, player } => {
            let removed = ctx.db.unassign_player(team, term, player)?;
            ctx.emit(&removed, |r| {
                if *r {
                    println!("✓ Player {} removed from team {}", player, team);
                } else {
                    println!("Player {} was not on team {} for term {}", player, team, term);
                }
            })
        }

        TeamCmd::Roster { team, term } => {
            let roster = ctx.db.team_roster(team, term)?;
            ctx.emit(&roster, |r| print_roster(r))
        }
    }
}

/// Handle the `term` command group
pub fn handle_term(ctx: &mut CommandContext, cmd: TermCmd) -> Result<()> {
    match cmd {
        TermCmd::Add { name, starts, ends } => {
            let term = ctx.db.add_term(&name, starts, ends)?;
            ctx.emit(&term, |t| {
                println!("✓ Added term {} ({}): {} to {}", t.name, t.id, t.starts_on, t.ends_on)
            })
        }

        TermCmd::List => {
            let terms = ctx.db.list_terms()?;
            ctx.emit(&terms, |t| print_terms(t))
        }

        TermCmd::Current { date } => {
            let date = date.unwrap_or_else(today);
            let term = ctx
                .db
                .term_for_date(date)?
                .ok_or_else(|| ClubError::NoTermForDate {
                    date: date.to_string(),
                })?;
            ctx.emit(&term, |t| print_terms(std::slice::from_ref(t)))
        }

        TermCmd::Teams { term } => {
            let team_terms = ctx.db.team_terms_for_term(term)?;
            ctx.emit(&team_terms, |tt| print_team_terms(tt))
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusChange {
    registration: PlayerTermId,
    status: RegistrationStatus,
}

/// Handle the `register` command group
pub fn handle_register(ctx: &mut CommandContext, cmd: RegisterCmd) -> Result<()> {
    match cmd {
        RegisterCmd::Add {
            player,
            term,
            status,
        } => {
            let player_term = ctx.db.register_player(player, term, status)?;
            ctx.emit(&player_term, |pt| {
                println!(
                    "✓ Player {} registered for term {} ({}, registration {})",
                    pt.player_id, pt.term_id, pt.status, pt.id
                )
            })
        }

        RegisterCmd::List { term, status } => {
            let registrations = ctx.db.registrations_for_term(term, status)?;
            ctx.emit(&registrations, |r| print_registrations(r))
        }

        RegisterCmd::SetStatus {
            registration,
            status,
        } => {
            ctx.db.set_registration_status(registration, status)?;
            ctx.emit(
                &StatusChange {
                    registration,
                    status,
                },
                |c| println!("✓ Registration {} is now {}", c.registration, c.status),
            )
        }
    }
}
