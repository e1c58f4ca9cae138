/// Display helpers for validation reports and command results.
///
/// Keeps the terminal summary consistent across commands: warnings first in
/// yellow, then errors in red, each followed by the file it came from.
use console::Style;

use crate::validate::{Finding, ValidationReport};

/// Render one finding as `message (file)`, dimming the file
pub fn format_finding(finding: &Finding) -> String {
    match &finding.file {
        Some(file) => format!(
            "{} {}",
            finding.message,
            Style::new().dim().apply_to(format!("({file})"))
        ),
        None => finding.message.clone(),
    }
}

/// Lines of the report summary, without trailing newlines
pub fn report_lines(report: &ValidationReport) -> Vec<String> {
    let mut lines = Vec::new();
    let sections = [
        ("Warnings", Style::new().bold().yellow(), report.warnings()),
        ("Errors", Style::new().bold().red(), report.errors()),
    ];

    for (title, style, findings) in sections {
        if findings.is_empty() {
            continue;
        }
        lines.push(format!(
            "{} ({}):",
            style.apply_to(title),
            findings.len()
        ));
        lines.extend(
            findings
                .iter()
                .map(|finding| format!("  - {}", format_finding(finding))),
        );
    }
    lines
}

/// Print the report summary to stderr
pub fn print_report(report: &ValidationReport) {
    for line in report_lines(report) {
        eprintln!("{line}");
    }
}

/// Print a green success line to stdout
pub fn print_success(message: &str) {
    println!("{} {message}", Style::new().green().bold().apply_to("✔"));
}
