//! User-facing console output.
//! Colored only when stdout is a TTY; plain prefixes otherwise so output stays scriptable.

use owo_colors::OwoColorize;

use crate::pipeline::RunReport;

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {msg}");
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {msg}");
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {msg}");
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {msg}");
    }
}

/// Print a plain user-facing line (no prefix).
pub fn print_user(msg: &str) {
    println!("{msg}");
}

/// Render the end-of-run summary as plain lines.
pub fn summary_lines(report: &RunReport, dry_run: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "Scanned {} files in {} batches; {} dated, {} without a date",
        report.files_scanned, report.batches, report.planned, report.unresolved
    )];
    if dry_run {
        lines.push(format!("Would place {} files", report.would_act));
    } else {
        lines.push(format!("Moved {}, copied {}", report.moved, report.copied));
    }
    lines.push(format!(
        "Dates from: create date {}, modify date {}, file name {}",
        report.by_create_date, report.by_modify_date, report.by_file_name
    ));
    if report.skipped_existing > 0 {
        lines.push(format!(
            "Skipped {} files already present at the destination",
            report.skipped_existing
        ));
    }
    lines
}

/// Print the summary; failures are reported on stderr.
pub fn print_summary(report: &RunReport, dry_run: bool) {
    let lines = summary_lines(report, dry_run);
    if report.has_failures() {
        for line in &lines {
            print_user(line);
        }
        print_warn(&format!(
            "{} files failed, {} batches failed (see log for details)",
            report.failed_files, report.failed_batches
        ));
    } else if let Some((last, rest)) = lines.split_last() {
        for line in rest {
            print_user(line);
        }
        print_success(last);
    }
}
