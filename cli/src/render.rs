//! Plain-text rendering of fleet data for the terminal.

use std::fmt::Write;

use fleet_core::{
    BusFilter, BusRecord, ErrorKind, FleetStats, PageView, PaginationControl, RequestError,
    WindowEntry,
};

pub fn render_page(view: &PageView, filter: BusFilter) -> String {
    let visible = view.visible(filter);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} buses in the fleet (filter: {filter})",
        view.metadata.total_elements
    );
    if visible.is_empty() {
        out.push_str("No buses to show.\n");
    } else {
        out.push_str(&render_table(&visible));
    }

    let stats = view.stats();
    let _ = writeln!(
        out,
        "This page: {} active, {} inactive",
        stats.active, stats.inactive
    );

    if let Some(control) = &view.control {
        out.push('\n');
        out.push_str(&render_pagination(control));
    }
    out
}

pub fn render_table(records: &[&BusRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6}  {:>6}  {:<10}  {:<15}  {:<8}  {:<20}  {}",
        "ID", "NUMBER", "PLATE", "BRAND", "STATUS", "CREATED", "CHARACTERISTICS"
    );
    for bus in records {
        let _ = writeln!(
            out,
            "{:>6}  {:>6}  {:<10}  {:<15}  {:<8}  {:<20}  {}",
            bus.id,
            bus.bus_number,
            bus.license_plate,
            bus.brand,
            status_label(bus.is_active),
            bus.created_at,
            bus.characteristics
        );
    }
    out
}

/// `‹ 1 … 4 [5] 6 … 10 ›` followed by the range line. Unavailable arrows are
/// replaced by spaces so the bar does not shift.
pub fn render_pagination(control: &PaginationControl) -> String {
    let arrow = |available: bool, glyph: &str| {
        if available {
            glyph.to_string()
        } else {
            " ".to_string()
        }
    };
    let mut parts = Vec::with_capacity(control.window.len() + 2);
    parts.push(arrow(control.has_previous, "‹"));
    for entry in &control.window {
        let label = entry.label();
        match entry {
            WindowEntry::Page(index) if *index == control.current_page => parts.push(format!("[{label}]")),
            _ => parts.push(label),
        }
    }
    parts.push(arrow(control.has_next, "›"));
    format!("{}\n{}\n", parts.join(" ").trim_end(), control.range)
}

pub fn render_bus(bus: &BusRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Bus #{} (id {})", bus.bus_number, bus.id);
    let _ = writeln!(out, "  License plate:   {}", bus.license_plate);
    let _ = writeln!(out, "  Brand:           {}", bus.brand);
    let _ = writeln!(out, "  Status:          {}", status_label(bus.is_active));
    let _ = writeln!(out, "  Created:         {}", bus.created_at);
    let _ = writeln!(out, "  Characteristics: {}", bus.characteristics);
    out
}

pub fn render_stats(stats: &FleetStats) -> String {
    format!(
        "Total: {}\nActive: {}\nInactive: {}\n",
        stats.total, stats.active, stats.inactive
    )
}

pub fn render_error(err: &RequestError) -> String {
    let headline = match (err.kind(), err.status()) {
        (ErrorKind::Transport, _) if err.is_timeout() => "The fleet service did not answer in time.".to_string(),
        (ErrorKind::Transport, _) => "Could not reach the fleet service.".to_string(),
        (ErrorKind::Application, Some(404)) => "Not found.".to_string(),
        (ErrorKind::Application, Some(200..=299)) => {
            "The fleet service sent a response that could not be used.".to_string()
        }
        (ErrorKind::Application, Some(status)) => format!("The fleet service returned an error ({status})."),
        (ErrorKind::Application, None) => "The request could not be prepared.".to_string(),
    };
    format!("{headline}\n  {err}\nRun the same command again to retry.\n")
}

fn status_label(active: bool) -> &'static str {
    if active {
        "active"
    } else {
        "inactive"
    }
}
