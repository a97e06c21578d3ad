//! Styled terminal output for the generator.
//!
//! Status lines go to stdout, errors to stderr.

use owo_colors::OwoColorize;

// Pastel palette
const MINT: (u8, u8, u8) = (152, 225, 152);
const CORAL: (u8, u8, u8) = (255, 160, 160);
const CREAM: (u8, u8, u8) = (255, 230, 160);
const SKY: (u8, u8, u8) = (160, 200, 255);
const LAVENDER: (u8, u8, u8) = (181, 174, 254);
const TEAL: (u8, u8, u8) = (120, 180, 195);
const GREY: (u8, u8, u8) = (160, 160, 160);

fn paint(text: &str, (r, g, b): (u8, u8, u8)) -> String {
    text.truecolor(r, g, b).to_string()
}

fn symbol_line(symbol: &str, color: (u8, u8, u8), message: &str) -> String {
    format!(
        "{} {}",
        paint(symbol, color).bold(),
        message.bright_white()
    )
}

pub fn success(message: &str) {
    println!("{}", symbol_line("✓", MINT, message));
}

pub fn error(message: &str) {
    eprintln!("{}", symbol_line("✗", CORAL, message));
}

pub fn warning(message: &str) {
    println!("{}", symbol_line("⚠", CREAM, message));
}

pub fn info(message: &str) {
    println!("{}", symbol_line("ℹ", SKY, message));
}

/// Section header followed by a full-width rule
pub fn section(title: &str) {
    println!("\n{}", paint(title, LAVENDER).bold());
    println!("{}", paint(&"─".repeat(50), GREY));
}

/// Lighter header with a dotted rule
pub fn subsection(title: &str) {
    println!("\n{}", paint(title, TEAL));
    println!("{}", paint(&"·".repeat(30), GREY));
}

pub fn key_value(key: &str, value: &str) {
    println!("  {} {}", paint(&format!("{}:", key), GREY), value.bright_white());
}

pub fn key_value_highlight(key: &str, value: &str) {
    println!(
        "  {} {}",
        paint(&format!("{}:", key), GREY),
        paint(value, TEAL).bold()
    );
}

pub fn dimmed(message: &str) {
    println!("{}", paint(message, GREY));
}

pub fn list_item(text: &str) {
    println!("  {} {}", paint("•", GREY), text.bright_white());
}

/// Numbered follow-up instructions
pub fn next_steps(steps: &[String]) {
    subsection("Next steps");
    for (i, step) in steps.iter().enumerate() {
        println!(
            "  {} {}",
            paint(&format!("{}.", i + 1), LAVENDER),
            step.bright_white()
        );
    }
}

pub fn blank() {
    println!();
}
