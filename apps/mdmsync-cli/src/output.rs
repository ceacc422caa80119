//! Terminal output helpers

use mdmsync_reconcile::{JobReport, ReportOutcome};

/// Check if color output is enabled
fn use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a success message (green checkmark)
pub fn print_success(message: &str) {
    if use_color() {
        println!("\x1b[32m✓\x1b[0m {}", message);
    } else {
        println!("OK: {}", message);
    }
}

/// Print a warning message (yellow)
pub fn print_warning(message: &str) {
    if use_color() {
        eprintln!("\x1b[33mWarning:\x1b[0m {}", message);
    } else {
        eprintln!("Warning: {}", message);
    }
}

/// Print a header with decorative border
pub fn print_header(title: &str) {
    let border = "═".repeat(59);
    println!();
    println!("{}", border);
    println!("{:^59}", title);
    println!("{}", border);
    println!();
}

/// Print a key-value pair with consistent formatting
pub fn print_key_value(key: &str, value: &str) {
    if use_color() {
        println!("  \x1b[1m{}:\x1b[0m {}", key, value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// One-screen summary of a finished job.
pub fn print_summary(report: &JobReport, outcome: &ReportOutcome) {
    let stats = &report.statistics;
    let mode = if report.dry_run { "dry-run" } else { "live" };

    print_header(&format!("{} ({})", report.job, mode));
    print_key_value("Run ID", &report.run_id.to_string());
    print_key_value("Spaces scanned", &stats.spaces_scanned.to_string());
    print_key_value(
        "Records",
        &format!(
            "{} collected of {} declared",
            stats.records_collected, stats.records_declared
        ),
    );
    if stats.directory_records > 0 {
        print_key_value("Directory records", &stats.directory_records.to_string());
    }
    print_key_value("Devices evaluated", &stats.devices_evaluated.to_string());
    print_key_value("Out of scope", &stats.devices_out_of_scope.to_string());
    print_key_value("Already compliant", &stats.devices_unchanged.to_string());
    for (kind, count) in &stats.actions_planned {
        print_key_value(&format!("Planned {}", kind), &count.to_string());
    }
    print_key_value(
        "Writes",
        &format!(
            "{} succeeded, {} failed, {} dry-run, {} withheld",
            stats.writes_succeeded, stats.writes_failed, stats.writes_dry_run, stats.writes_withheld
        ),
    );
    print_key_value("Duration", &format!("{} ms", stats.duration_ms));
    println!();

    if stats.failed_pages > 0 || stats.discrepancy() > 0 {
        print_warning(&format!(
            "{} page(s) failed; {} declared record(s) were not collected",
            stats.failed_pages,
            stats.discrepancy()
        ));
    }
    if stats.writes_withheld > 0 {
        print_warning(&format!(
            "{} write(s) were withheld because their evidence was incomplete; re-run to apply them",
            stats.writes_withheld
        ));
    }
    if stats.writes_failed > 0 {
        print_warning(&format!(
            "{} write(s) were rejected; see the report for status codes",
            stats.writes_failed
        ));
    }
    if stats.lookups_failed > 0 {
        print_warning(&format!(
            "{} per-device lookup(s) failed",
            stats.lookups_failed
        ));
    }

    match outcome {
        ReportOutcome::Written { path, rows } => {
            print_success(&format!("Wrote {} row(s) to {}", rows, path.display()));
        }
        ReportOutcome::Skipped => print_success("Nothing to report, no file written"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_color_respects_no_color() {
        let had_no_color = std::env::var("NO_COLOR").is_ok();

        std::env::set_var("NO_COLOR", "1");
        assert!(!use_color());

        std::env::remove_var("NO_COLOR");
        assert!(use_color());

        if had_no_color {
            std::env::set_var("NO_COLOR", "1");
        }
    }
}
