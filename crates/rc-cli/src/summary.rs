use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use rc_core::RunSummary;
use rc_model::{Action, OrgGroupCatalogue};

pub fn print_run_summary(action: Action, output: &Path, summary: &RunSummary) {
    println!("Output: {}", output.display());
    println!("{}", counts_table(summary));
    if !summary.message_summary.is_empty() {
        println!();
        println!("Messages:");
        println!("{}", messages_table(summary));
    }
    if summary.success {
        println!("{action} complete: no records failed.");
    } else {
        println!("{action} complete: {} of {} records failed.", summary.counts.fail, summary.counts.total);
    }
}

pub fn counts_table(summary: &RunSummary) -> Table {
    let counts = summary.counts;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Result"), header_cell("Records")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("pass"), count_cell(counts.pass, Color::Green)]);
    table.add_row(vec![Cell::new("warn"), count_cell(counts.warn, Color::Yellow)]);
    table.add_row(vec![Cell::new("fail"), count_cell(counts.fail, Color::Red)]);
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(counts.total).add_attribute(Attribute::Bold),
    ]);
    table
}

pub fn messages_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Message"), header_cell("Count")]);
    apply_message_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (message, count) in &summary.message_summary {
        table.add_row(vec![Cell::new(message), Cell::new(count)]);
    }
    table
}

/// Two-column table of `(setting, value)` pairs.
pub fn settings_table(settings: &[(String, String)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Setting"), header_cell("Value")]);
    apply_table_style(&mut table);
    for (setting, value) in settings {
        table.add_row(vec![Cell::new(setting), Cell::new(value)]);
    }
    table
}

pub fn columns_table(columns: &[String]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Column")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, name) in columns.iter().enumerate() {
        let name_cell = if name.trim().is_empty() {
            dim_cell("(blank)")
        } else {
            Cell::new(name)
        };
        table.add_row(vec![Cell::new(index), name_cell]);
    }
    table
}

pub fn catalogue_table(catalogue: &OrgGroupCatalogue) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Organisation"),
        header_cell("Group"),
        header_cell("Rules"),
    ]);
    apply_table_style(&mut table);
    for (organisation, groups) in catalogue {
        for (group, rules) in groups {
            let rules_cell = if rules.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(rules.join(", "))
            };
            table.add_row(vec![Cell::new(organisation), Cell::new(group), rules_cell]);
        }
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(60);
}

fn apply_message_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Percentage(90)),
        ColumnConstraint::LowerBoundary(Width::Fixed(7)),
    ]);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
