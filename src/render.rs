use std::io::{self, Write};
use std::path::Path;

use crate::publication::Publication;

/// Render publications as a YAML block list, one block per record, in the order given.
pub fn render(publications: &[Publication]) -> String {
    let mut out = String::new();
    for p in publications {
        render_one(&mut out, p);
        out.push('\n');
    }
    out
}

fn render_one(out: &mut String, p: &Publication) {
    out.push_str(&format!("- title: {}\n", quoted(&p.title)));
    out.push_str(&format!("  description: {}\n", quoted(&p.description)));
    out.push_str(&format!("  authors: {}\n", quoted(&p.authors)));
    out.push_str(&format!("  year: {}\n", p.year));
    out.push_str("  harvard:");
    literal_block(out, &p.citation_text, "    ");
    out.push_str("  link:\n");
    out.push_str(&format!("    url: {}\n", quoted(&p.link.url)));
    out.push_str(&format!("    display: {}\n", quoted(&p.link.display)));
}

/// Replace the file at `path` with the rendered list.
pub fn write(publications: &[Publication], path: &Path) -> io::Result<()> {
    std::fs::write(path, render(publications))
}

/// Write the rendered list to stdout.
pub fn print(publications: &[Publication]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(render(publications).as_bytes())?;
    lock.flush()
}

fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{85}' => out.push_str("\\N"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Appends ` |-` and the indented lines, or a quoted scalar when the text
/// cannot survive a literal block unchanged.
fn literal_block(out: &mut String, text: &str, indent: &str) {
    let leading_space = text
        .split('\n')
        .find(|line| !line.is_empty())
        .map_or(true, |line| line.starts_with(' '));
    let representable = !leading_space
        && !text.ends_with('\n')
        && !text.chars().any(|c| (c.is_control() && c != '\n') || is_yaml_break(c));
    if !representable {
        out.push_str(&format!(" {}\n", quoted(text)));
        return;
    }

    out.push_str(" |-\n");
    for line in text.split('\n') {
        if !line.is_empty() {
            out.push_str(indent);
            out.push_str(line);
        }
        out.push('\n');
    }
}

/// Characters YAML treats as line breaks besides `\n` and `\r`.
fn is_yaml_break(c: char) -> bool {
    matches!(c, '\u{85}' | '\u{2028}' | '\u{2029}')
}
