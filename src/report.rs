use crate::source::Source;
use unicode_width::UnicodeWidthStr;

/// Render the lines leading up to `offset`, the offending line, and a `~`
/// underline beneath the part of that line that did not parse.
pub fn context_dump(source: &Source, offset: usize, context_lines: usize) -> String {
    let text = source.as_string();
    let lines: Vec<&str> = text.split('\n').collect();
    let position = source.position(offset);
    let row = (position.line - 1).min(lines.len().saturating_sub(1));
    let line = lines.get(row).copied().unwrap_or("");

    let split = line
        .char_indices()
        .nth(position.column)
        .map_or(line.len(), |(i, _)| i);
    let (prefix, rest) = line.split_at(split);
    let rest = rest.trim_end_matches([' ', '\r']);

    let mut out = String::new();
    for shown in &lines[row.saturating_sub(context_lines)..=row] {
        out.push_str(shown.trim_end_matches('\r'));
        out.push('\n');
    }
    out.push_str(&" ".repeat(prefix.width()));
    out.push_str(&"~".repeat(rest.width().max(1)));
    out.push('\n');
    out.push_str(&format!("error: unparsed input at {}", position));
    out
}
