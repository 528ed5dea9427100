use colored::*;
use console::{measure_text_width, pad_str, style, Alignment};
use std::path::Path;

pub fn init() {
    // Enable colored output on Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();
}

pub fn info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}

pub fn success(message: &str) {
    println!("{} {}", style("✓").green(), message.green());
}

pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red(), message.red());
}

pub fn warn(message: &str) {
    println!("{} {}", style("⚠").yellow(), message.yellow());
}

pub fn hint(message: &str) {
    println!("{} {}", style("💡").cyan(), message.dimmed());
}

pub fn section(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// One labelled location, marked by whether it exists on disk.
pub fn location(label: &str, path: &Path) {
    let marker = if path.exists() {
        "present".green()
    } else {
        "missing".dimmed()
    };
    println!("  {:<18} {} ({})", label, path.display(), marker);
}

/// Prints a table; widths ignore ANSI styling so colored cells line up.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(measure_text_width(cell));
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad_str(&h.bold().to_string(), *w, Alignment::Left, None).into_owned())
        .collect();
    println!("{}", header_line.join(" "));

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w).dimmed().to_string()).collect();
    println!("{}", separator.join(" "));

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad_str(cell, *w, Alignment::Left, None).into_owned())
            .collect();
        println!("{}", line.join(" "));
    }
}
