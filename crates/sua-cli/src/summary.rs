use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sua_cli::logging::redact_value;
use sua_model::Severity;
use sua_schema::SchemaRegistry;

use crate::commands::ValidateOutcome;

pub fn print_summary(outcome: &ValidateOutcome, max_violations: usize) {
    let result = &outcome.result;
    let totals = &result.totals;

    println!("File type: {}", result.file_type);
    if let Some(path) = &outcome.report_path {
        println!("Report: {}", path.display());
    }

    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![
        header_cell("Records"),
        header_cell("Valid"),
        header_cell("Invalid"),
        header_cell("Warnings"),
        header_cell("Structural"),
    ]);
    table.add_row(vec![
        Cell::new(totals.records),
        Cell::new(totals.valid_records).fg(Color::Green),
        count_cell(totals.invalid_records, Color::Red),
        count_cell(totals.warnings, Color::Yellow),
        count_cell(totals.structural_failures, Color::Red),
    ]);
    println!("{table}");

    if !totals.rule_triggers.is_empty() {
        let mut table = Table::new();
        apply_table_style(&mut table);
        table.set_header(vec![header_cell("Rule"), header_cell("Triggered")]);
        align_column(&mut table, 1, CellAlignment::Right);
        for (code, count) in &totals.rule_triggers {
            table.add_row(vec![Cell::new(code), Cell::new(count)]);
        }
        println!("{table}");
    }

    let violations: Vec<_> = result.violations().collect();
    if violations.is_empty() {
        return;
    }
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![
        header_cell("Line"),
        header_cell("Code"),
        header_cell("Severity"),
        header_cell("Field"),
        header_cell("Observed"),
        header_cell("Message"),
    ]);
    align_column(&mut table, 0, CellAlignment::Right);
    for violation in violations.iter().take(max_violations) {
        table.add_row(vec![
            Cell::new(violation.line_number),
            Cell::new(&violation.rule_code),
            severity_cell(violation.severity),
            Cell::new(violation.field.as_deref().unwrap_or("-")),
            Cell::new(violation.observed.as_deref().map(redact_value).unwrap_or("-")),
            Cell::new(&violation.message),
        ]);
    }
    println!("{table}");
    if violations.len() > max_violations {
        println!(
            "... {} more violation(s); see the JSON report for the full list",
            violations.len() - max_violations
        );
    }
}

pub fn print_schemas(registry: &SchemaRegistry) {
    for schema in registry.schemas() {
        println!(
            "{} ({}), currency {}",
            schema.file_type(),
            schema.name(),
            schema.currency()
        );
        for record in schema.records() {
            let mut table = Table::new();
            apply_table_style(&mut table);
            table.set_header(vec![
                header_cell("Field"),
                header_cell("Span"),
                header_cell("Type"),
                header_cell("Required"),
            ]);
            align_column(&mut table, 1, CellAlignment::Right);
            for field in record.fields() {
                table.add_row(vec![
                    Cell::new(field.name()),
                    Cell::new(format!("{}-{}", field.start(), field.end())),
                    Cell::new(field.field_type()),
                    Cell::new(if field.is_required() { "yes" } else { "" }),
                ]);
            }
            println!(
                "  record type {} ({}, {} chars)",
                record.code(),
                record.kind(),
                record.line_length()
            );
            println!("{table}");
        }
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: u64, color: Color) -> Cell {
    if count == 0 {
        Cell::new(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("error").fg(Color::Red),
        Severity::Warning => Cell::new("warning").fg(Color::Yellow),
        Severity::Info => Cell::new("info").fg(Color::Blue),
    }
}
