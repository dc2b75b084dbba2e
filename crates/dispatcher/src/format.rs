//! Export formatter
//!
//! Two renderings of a completed calibration run: a flat summary row with a
//! fixed column order for append-only CSV storage, and a human-readable
//! grid of per-band statistics for the console.

use chrono::{DateTime, Duration, Utc};

use contracts::{Band, Channel, ExportRecord, StatsReport, CHANNEL_ORDER};

/// Timestamp format used in CSV exports
pub const TSTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format a timestamp for export, rounded to the nearest second
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    (timestamp + Duration::milliseconds(500))
        .format(TSTAMP_FORMAT)
        .to_string()
}

/// Summary CSV header, in the fixed persisted column order
pub fn summary_header() -> Vec<String> {
    let mut columns = vec![
        "Timestamp".to_string(),
        "# Samples".to_string(),
        "Wavelength".to_string(),
        "Photodiode (nA)".to_string(),
        "Quantum Efficiency".to_string(),
    ];
    for band in Band::ALL {
        columns.push(band.display_name().to_string());
        columns.push("StdDev".to_string());
        columns.push(format!("{} (raw)", band.display_name()));
        columns.push("StdDev".to_string());
    }
    columns
}

/// Summary CSV row for one saved run, matching [`summary_header`]
pub fn summary_row(record: &ExportRecord) -> Vec<String> {
    let report = &record.report;
    let mut row = vec![
        format_timestamp(record.timestamp),
        report.sample_count.to_string(),
        report.wavelength_nm.to_string(),
        format!("{}", record.photodiode_na),
        format!("{:.3}", record.quantum_efficiency),
    ];
    for band in Band::ALL {
        for raw in [false, true] {
            let stats = report
                .channel(Channel { band, raw })
                .unwrap_or(contracts::ChannelStats {
                    mean: 0.0,
                    stddev: 0.0,
                });
            row.push(format!("{:.2}", stats.mean));
            row.push(format!("{:.2}", stats.stddev));
        }
    }
    row
}

/// Render the session header and per-band statistics grids
pub fn render_report(report: &StatsReport) -> String {
    let session = grid(
        &["Samples", "Wavelength (nm)", "Exp. Time (ms)", "Gain"],
        &[vec![
            report.sample_count.to_string(),
            report.wavelength_nm.to_string(),
            format!("{:.1}", report.exposure_ms),
            format!("{:.1}", report.gain),
        ]],
    );

    let rows: Vec<Vec<String>> = CHANNEL_ORDER
        .iter()
        .filter_map(|channel| {
            report.channel(*channel).map(|stats| {
                vec![
                    channel.name().to_string(),
                    format!("{:.2}", stats.mean),
                    format!("{:.2}", stats.stddev),
                ]
            })
        })
        .collect();
    let bands = grid(&["Band", "Average Flux", "Std. Deviation"], &rows);

    format!("{session}\n{bands}")
}

/// Plain-text grid with `+---+` borders, numeric cells right-aligned
fn grid(headers: &[&str], rows: &[Vec<String>]) -> String {
    let columns = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(columns) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let border: String = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    };

    let render_row = |cells: &[String]| -> String {
        let mut line = String::from("|");
        for (i, cell) in cells.iter().enumerate() {
            let numeric = cell.chars().next().is_some_and(|c| c.is_ascii_digit());
            if numeric {
                line.push_str(&format!(" {:>width$} |", cell, width = widths[i]));
            } else {
                line.push_str(&format!(" {:<width$} |", cell, width = widths[i]));
            }
        }
        line
    };

    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');
    out.push_str(&render_row(
        &headers.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
    ));
    out.push('\n');
    out.push_str(&border);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&border);
    out
}
