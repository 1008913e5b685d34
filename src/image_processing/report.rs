//! Summary table printed at the end of a run when `--report` is given.

use prettytable::{format, Cell, Row, Table};

use super::SplitReport;
use crate::utils::format_duration;

/// Build the per-split summary table
pub fn build_table(reports: &[SplitReport], dry_run: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);

    let count_header = if dry_run { "Would write" } else { "Written" };
    table.add_row(Row::new(vec![
        Cell::new("Split"),
        Cell::new(count_header),
        Cell::new("Output directory"),
        Cell::new("Time"),
        Cell::new("Images/s"),
    ]));

    for report in reports {
        table.add_row(Row::new(vec![
            Cell::new(report.split.dir_name()),
            Cell::new(&report.processed.to_string()),
            Cell::new(&report.output_dir.display().to_string()),
            Cell::new(&format_duration(report.duration)),
            Cell::new(&format!("{:.1}", report.images_per_second())),
        ]));
    }

    let total: usize = reports.iter().map(|r| r.processed).sum();
    table.add_row(Row::new(vec![
        Cell::new("total"),
        Cell::new(&total.to_string()),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
    ]));

    table
}

/// Print the summary table to stdout
pub fn print(reports: &[SplitReport], dry_run: bool) {
    println!();
    build_table(reports, dry_run).printstd();
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processing::Split;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_build_table_has_row_per_split_plus_total() {
        let reports = vec![
            SplitReport {
                split: Split::Train,
                processed: 3,
                output_dir: PathBuf::from("out/train_data"),
                duration: Duration::from_millis(300),
            },
            SplitReport {
                split: Split::Val,
                processed: 1,
                output_dir: PathBuf::from("out/val_data"),
                duration: Duration::from_millis(100),
            },
        ];

        let table = build_table(&reports, false);
        // header + 2 splits + total
        assert_eq!(table.len(), 4);

        let rendered = table.to_string();
        assert!(rendered.contains("train_data"));
        assert!(rendered.contains("Written"));
        assert!(rendered.contains("total"));
    }

    #[test]
    fn test_build_table_dry_run_header() {
        let table = build_table(&[], true);
        assert!(table.to_string().contains("Would write"));
    }
}
