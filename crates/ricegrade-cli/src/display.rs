//! Terminal rendering for standards, history pages, and inspection cards.

use chrono::{DateTime, Utc};
use ricegrade_core::{Catalog, CompositionRow, HistoryPage, Inspection, bound_label};

const MAX_NOTE_CHARS: usize = 40;

// ── Public API ──

/// Print every catalog standard with its scorable criteria.
pub fn print_standards(catalog: &Catalog) {
    if catalog.is_empty() {
        println!("(no standards loaded)");
        return;
    }
    for standard in catalog.standards() {
        println!("=== {} ===", standard.name);
        println!("  {:<26} {}", "id", standard.id);
        println!("  {:<26} {}", "key", standard.key);
        for c in &standard.standard_data {
            println!(
                "    {:<24} {:<12} ({} / {})",
                c.name,
                bound_label(c),
                c.condition_min,
                c.condition_max,
            );
        }
        println!();
    }
}

/// Print a single inspection as a vertical card, as the result page shows it.
pub fn print_inspection_card(inspection: &Inspection) {
    println!("=== {} ===", inspection.inspection_id);
    println!("{}", inspection.name);
    println!();

    println!("Identity");
    field("create_date", &format_date(&inspection.create_date));
    field("inspection_id", &inspection.inspection_id);
    field("standard", &inspection.standard_name);
    field("standard_id", &inspection.standard_id.to_string());
    println!();

    println!("Sampling");
    field("note", &inspection.note);
    field("price", &inspection.price);
    if let Some(date) = &inspection.sampling_date {
        field("sampling_date", &format_date(date));
    }
    if !inspection.sampling_point.is_empty() {
        field("sampling_point", &inspection.sampling_point.join(", "));
    }
    if let Some(link) = &inspection.image_link {
        field("image_link", link);
    }
    println!();

    println!("Composition");
    print_composition(&inspection.composition());
}

/// Print the Name / Standard / Actual table.
pub fn print_composition(rows: &[CompositionRow]) {
    if rows.is_empty() {
        println!("  (no criteria)");
        return;
    }
    println!("  {:<24} {:<14} {:>10}", "Name", "Standard", "Actual");
    for row in rows {
        println!("  {:<24} {:<14} {:>10}", row.name, row.standard, row.actual);
    }
}

/// Print one history page as a table.
pub fn print_history(page: &HistoryPage) {
    println!(
        "  {:<20} {:<34} {:<20} {:<16} {}",
        "Create Date", "Inspection ID", "Name", "Standard", "Note"
    );
    for inspection in &page.data {
        println!(
            "  {:<20} {:<34} {:<20} {:<16} {}",
            format_date(&inspection.create_date),
            inspection.inspection_id,
            inspection.name,
            inspection.standard_name,
            truncate(&inspection.note, MAX_NOTE_CHARS),
        );
    }
    println!();
    println!(
        "  page {} of {} ({} inspections)",
        page.current_page,
        page.total_pages.max(1),
        page.total
    );
}

// ── Helpers ──

fn field(name: &str, value: &str) {
    if !value.is_empty() {
        println!("  {:<26} {}", name, value);
    }
}

/// `dd/mm/yyyy HH:MM:SS`, the result page's en-GB layout.
fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%d/%m/%Y %H:%M:%S").to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max - 3).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
