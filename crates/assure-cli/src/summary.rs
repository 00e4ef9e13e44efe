use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use assure_report::OverallStatus;

use crate::commands::ValidateResult;

pub fn print_summary(result: &ValidateResult) {
    let report = &result.report;
    print!("{}", report.transcript());
    println!();

    let summary = report.summary();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        header_cell("Checks"),
        header_cell("Passed"),
        header_cell("Failed"),
        header_cell("Errors"),
        header_cell("Status"),
    ]);
    for idx in 0..4 {
        align_column(&mut table, idx, CellAlignment::Right);
    }
    align_column(&mut table, 4, CellAlignment::Center);
    table.add_row(vec![
        Cell::new(summary.total_checks),
        count_cell(summary.pass_count, Color::Green),
        count_cell(summary.fail_count, Color::Yellow),
        count_cell(summary.error_count, Color::Red),
        status_cell(summary.overall_status),
    ]);
    println!("{table}");

    if let Some(path) = &result.transcript_path {
        println!("Report: {}", path.display());
    }
    if let Some(path) = &result.json_path {
        println!("JSON report: {}", path.display());
    }
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        Cell::new(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn status_cell(status: OverallStatus) -> Cell {
    let color = match status {
        OverallStatus::Pass => Color::Green,
        OverallStatus::Warning => Color::Yellow,
        OverallStatus::Critical => Color::Red,
    };
    Cell::new(status.as_str())
        .fg(color)
        .add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
