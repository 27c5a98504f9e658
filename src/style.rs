//! Tiny ANSI styling helpers for the summary renderer: thin wrappers around
//! `console::Style`.
use console::Style;

pub fn ered(s: impl AsRef<str>) -> console::StyledObject<String> {
    Style::new().red().apply_to(s.as_ref().to_string())
}

pub fn ebold(s: impl AsRef<str>) -> console::StyledObject<String> {
    Style::new().bold().apply_to(s.as_ref().to_string())
}

pub fn edim(s: impl AsRef<str>) -> console::StyledObject<String> {
    Style::new().dim().apply_to(s.as_ref().to_string())
}
