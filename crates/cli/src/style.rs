//! Terminal styling for merge output.

use console::Style;

/// Green check mark, then `msg`.
pub fn success(msg: &str) -> String {
    let style = Style::new().green();
    format!("{} {}", style.apply_to("✓"), msg)
}

/// Red cross, then `msg`.
pub fn error(msg: &str) -> String {
    let style = Style::new().red();
    format!("{} {}", style.apply_to("✗"), msg)
}

/// Yellow warning sign, then `msg`. Used for skipped source files.
pub fn warn(msg: &str) -> String {
    let style = Style::new().yellow();
    format!("{} {}", style.apply_to("⚠"), msg)
}

/// Bold text for status lines and conflict headings.
pub fn header(msg: &str) -> String {
    let style = Style::new().bold();
    style.apply_to(msg).to_string()
}

/// Dimmed text, e.g. the source file next to an option.
pub fn dim(msg: &str) -> String {
    let style = Style::new().dim();
    style.apply_to(msg).to_string()
}

/// A `[section]` label (cyan).
pub fn section(name: &str) -> String {
    let style = Style::new().cyan().bold();
    style.apply_to(format!("[{}]", name)).to_string()
}
