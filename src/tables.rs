use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    api::pvs6::legacy::DeviceList,
    quantity::energy::KilowattHours,
    summary::{DailyReport, monthly::MonthlyRollup},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

/// Inverters ranked by production, the flagged ones in red.
pub fn build_production_table(report: &DailyReport) -> Table {
    let mut table = new_table();
    table.set_header(vec!["#", "Serial", "Production", "Of average"]);
    let mean = report.production.mean().unwrap_or(KilowattHours::ZERO);
    for (index, (serial, production)) in report.production.ranked().into_iter().enumerate() {
        let is_flagged = report.findings.iter().any(|finding| finding.serial == serial);
        let percentage = if mean == KilowattHours::ZERO { 0.0 } else { production / mean * 100.0 };
        table.add_row(vec![
            Cell::new(index + 1).add_attribute(Attribute::Dim),
            Cell::new(serial),
            Cell::new(format!("{production:.2}")).set_alignment(CellAlignment::Right),
            Cell::new(format!("{percentage:.0}%"))
                .set_alignment(CellAlignment::Right)
                .fg(if is_flagged { Color::Red } else { Color::Green }),
        ]);
    }
    table
}

pub fn build_totals_table(report: &DailyReport) -> Table {
    let totals = &report.totals;
    let mut table = new_table();
    table.set_header(vec!["Date", "Production", "Consumption", "Net grid", "Samples"]);
    table.add_row(vec![
        Cell::new(report.date),
        Cell::new(format!("{:.2}", totals.production)).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.2}", totals.consumption)).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.2}", totals.net))
            .set_alignment(CellAlignment::Right)
            .fg(if totals.net <= KilowattHours::ZERO { Color::Green } else { Color::Red }),
        Cell::new(totals.n_samples).set_alignment(CellAlignment::Right).fg(
            if totals.is_low_confidence() { Color::DarkYellow } else { Color::Reset },
        ),
    ]);
    table
}

pub fn build_monthly_table(rollup: &MonthlyRollup, focus_year: i32) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Year", "Production", "Consumption", "Net grid", "Days", "Average"]);
    for totals in &rollup.years {
        let year = Cell::new(totals.year);
        table.add_row(vec![
            if totals.year == focus_year { year.add_attribute(Attribute::Bold) } else { year },
            Cell::new(format!("{:.2}", totals.production)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", totals.consumption))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(format!("{:.2}", totals.net)).set_alignment(CellAlignment::Right),
            Cell::new(totals.n_days()).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", totals.average_daily_production()))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_device_status_table(device_list: &DeviceList) -> Table {
    let mut table = new_table();
    table.set_header(vec!["#", "Inverter", "State"]);
    for (index, device) in device_list.inverters().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1).add_attribute(Attribute::Dim),
            Cell::new(&device.description),
            Cell::new(&device.state_description).fg(
                if device.state_description.eq_ignore_ascii_case("working") {
                    Color::Green
                } else {
                    Color::DarkYellow
                },
            ),
        ]);
    }
    table
}
