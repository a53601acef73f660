//! Event scheduling and roll commands

use super::common::{or_dash, percent, CommandContext};
use crate::{
    cli::{EventCmd, RollCmd},
    storage::{AttendanceSummary, Event, EventFilter, NewEvent, RollEntry, RollMark},
    EventId, Result,
};
use serde::Serialize;

fn print_events(events: &[Event]) {
    if events.is_empty() {
        println!("No events");
        return;
    }
    println!(
        "{:>5}  {:<16}  {:<5}  {:<10} {:<28} {:<16} {}",
        "ID", "Starts", "Until", "Kind", "Title", "Team", "Location"
    );
    for e in events {
        println!(
            "{:>5}  {:<16}  {:<5}  {:<10} {:<28} {:<16} {}",
            e.id,
            e.starts_at.format("%Y-%m-%d %H:%M").to_string(),
            e.ends_at.format("%H:%M").to_string(),
            e.kind,
            e.title,
            e.team_name.as_deref().unwrap_or("club-wide"),
            or_dash(e.location.as_deref()),
        );
    }
}

fn print_sheet(sheet: &[RollEntry]) {
    if sheet.is_empty() {
        println!("Nobody is expected at this event");
        return;
    }
    for entry in sheet {
        println!(
            "{:>5}  {:<28} {:<8} {}",
            entry.player_id,
            format!("{} {}", entry.first_name, entry.last_name),
            or_dash(entry.status),
            entry.notes.as_deref().unwrap_or(""),
        );
    }
    let marked = sheet.iter().filter(|e| e.status.is_some()).count();
    println!("{} of {} marked", marked, sheet.len());
}

fn print_summary(summary: &[AttendanceSummary]) {
    if summary.is_empty() {
        println!("No registrations in this term");
        return;
    }
    println!(
        "{:>5}  {:<28} {:>7} {:>5} {:>6} {:>6}",
        "ID", "Name", "Present", "Late", "Absent", "Rate"
    );
    for s in summary {
        println!(
            "{:>5}  {:<28} {:>7} {:>5} {:>6} {:>6}",
            s.player_id,
            format!("{} {}", s.first_name, s.last_name),
            s.present,
            s.late,
            s.absent,
            percent(s.attendance_rate),
        );
    }
}

/// Handle the `event` command group
pub fn handle_event(ctx: &mut CommandContext, cmd: EventCmd) -> Result<()> {
    match cmd {
        EventCmd::Add {
            kind,
            title,
            start,
            end,
            term,
            team,
            location,
            notes,
        } => {
            let event = ctx.db.create_event(&NewEvent {
                kind,
                title,
                starts_at: start,
                ends_at: end,
                term_id: term,
                team_id: team,
                location,
                notes,
            })?;
            ctx.emit(&event, |e| {
                println!("✓ Scheduled {} \"{}\" ({}) at {}", e.kind, e.title, e.id, e.starts_at)
            })
        }

        EventCmd::List {
            term,
            team,
            from,
            to,
        } => {
            let events = ctx.db.list_events(&EventFilter {
                term_id: term,
                team_id: team,
                from,
                to,
            })?;
            ctx.emit(&events, |e| print_events(e))
        }

        EventCmd::Reschedule { id, start, end } => {
            let event = ctx.db.reschedule_event(id, start, end)?;
            ctx.emit(&event, |e| {
                println!("✓ \"{}\" moved to {} until {}", e.title, e.starts_at, e.ends_at)
            })
        }

        EventCmd::Remove { id } => {
            let event = ctx.db.get_event(id)?;
            ctx.db.remove_event(id)?;
            ctx.emit(&event, |e| println!("✓ Removed \"{}\" ({})", e.title, e.id))
        }
    }
}

#[derive(Debug, Serialize)]
struct RollUpdate {
    event_id: EventId,
    recorded: usize,
}

/// Handle the `roll` command group
pub fn handle_roll(ctx: &mut CommandContext, cmd: RollCmd) -> Result<()> {
    match cmd {
        RollCmd::Show { event } => {
            let sheet = ctx.db.roll_sheet(event)?;
            ctx.emit(&sheet, |s| print_sheet(s))
        }

        RollCmd::Mark {
            event,
            player,
            status,
            notes,
        } => {
            ctx.db.mark_attendance(
                event,
                &RollMark {
                    player_id: player,
                    status,
                    notes,
                },
            )?;
            ctx.emit(
                &RollUpdate {
                    event_id: event,
                    recorded: 1,
                },
                |_| println!("✓ Player {} marked {}", player, status),
            )
        }

        RollCmd::Take { event, marks } => {
            let marks: Vec<RollMark> = marks
                .into_iter()
                .map(|m| RollMark {
                    player_id: m.player_id,
                    status: m.status,
                    notes: None,
                })
                .collect();
            let recorded = ctx.db.record_roll(event, &marks)?;
            ctx.emit(
                &RollUpdate {
                    event_id: event,
                    recorded,
                },
                |u| println!("✓ Recorded {} marks for event {}", u.recorded, u.event_id),
            )
        }

        RollCmd::Fill { event, status } => {
            let recorded = ctx.db.fill_roll(event, status)?;
            ctx.emit(
                &RollUpdate {
                    event_id: event,
                    recorded,
                },
                |u| println!("✓ Marked {} remaining players {}", u.recorded, status),
            )
        }

        RollCmd::Summary { term, team } => {
            let summary = ctx.db.attendance_summary(term, team)?;
            ctx.emit(&summary, |s| print_summary(s))
        }
    }
}
