//! Table rendering for command output

use colored::Colorize;
use tabled::{Table, Tabled};
use usher_rota_core::application::assignment::UnassignedVolunteer;
use usher_rota_core::application::ProcessSummary;
use usher_rota_core::domain::{AssignedVolunteer, Position, Volunteer};

const NONE: &str = "-";

#[derive(Tabled)]
struct ReceiptRow {
    name: String,
    group: String,
    role: String,
    position: String,
    zone: String,
}

impl From<&AssignedVolunteer> for ReceiptRow {
    fn from(a: &AssignedVolunteer) -> Self {
        Self {
            name: a.name.clone(),
            group: a.group_id.clone(),
            role: a.role_class.to_string(),
            position: format!("{} ({})", a.position_name, a.position_id),
            zone: a.zone.clone().unwrap_or_else(|| NONE.to_string()),
        }
    }
}

#[derive(Tabled)]
struct UnassignedRow {
    name: String,
    role: String,
    pool: String,
}

impl From<&UnassignedVolunteer> for UnassignedRow {
    fn from(u: &UnassignedVolunteer) -> Self {
        Self {
            name: u.name.clone(),
            role: u.role_class.to_string(),
            pool: u.pool.to_string(),
        }
    }
}

#[derive(Tabled)]
struct PositionRow {
    sequence: i64,
    id: String,
    name: String,
    zone: String,
    restricted: String,
}

#[derive(Tabled)]
struct RosterRow {
    name: String,
    group: String,
    role: String,
    position: String,
}

pub fn print_summary(summary: &ProcessSummary) {
    println!(
        "{}",
        format!(
            "✓ {} batch(es) processed, {} volunteer(s) assigned",
            summary.processed_items,
            summary.assigned.len()
        )
        .green()
        .bold()
    );

    if !summary.assigned.is_empty() {
        println!();
        let rows: Vec<ReceiptRow> = summary.assigned.iter().map(ReceiptRow::from).collect();
        println!("{}", Table::new(rows));
    }

    if !summary.unassigned.is_empty() {
        println!();
        println!(
            "{}",
            "⚠ No position left in the pool for these volunteers:"
                .yellow()
                .bold()
        );
        let rows: Vec<UnassignedRow> = summary
            .unassigned
            .iter()
            .map(UnassignedRow::from)
            .collect();
        println!("{}", Table::new(rows));
    }

    if summary.remaining > 0 {
        println!();
        println!("  {} {}", "Still queued:".bold(), summary.remaining);
    }
}

pub fn print_catalog(positions: &[Position]) {
    if positions.is_empty() {
        println!("{}", "No active positions".yellow());
        return;
    }

    let rows: Vec<PositionRow> = positions
        .iter()
        .map(|p| PositionRow {
            sequence: p.sequence,
            id: p.id.clone(),
            name: p.name.clone(),
            zone: p.zone.clone().unwrap_or_else(|| NONE.to_string()),
            restricted: if p.restricted { "yes" } else { "no" }.to_string(),
        })
        .collect();
    println!("{}", Table::new(rows));
}

pub fn print_roster(volunteers: &[Volunteer], catalog: &[Position]) {
    if volunteers.is_empty() {
        println!("{}", "No volunteers submitted for this event".yellow());
        return;
    }

    let position_label = |id: &str| {
        catalog
            .iter()
            .find(|p| p.id == id)
            .map(|p| format!("{} ({})", p.name, p.id))
            .unwrap_or_else(|| id.to_string())
    };

    let rows: Vec<RosterRow> = volunteers
        .iter()
        .map(|v| RosterRow {
            name: v.name.clone(),
            group: v.group_id.clone(),
            role: v.role_class().to_string(),
            position: match v.position_id.as_deref() {
                Some(id) if v.is_assigned() => position_label(id),
                _ => NONE.to_string(),
            },
        })
        .collect();
    println!("{}", Table::new(rows));
}
