use std::sync::LazyLock;

use htmd::options::{CodeBlockStyle, HeadingStyle, Options};
use htmd::{Element, HtmlToMarkdown};
use regex::Regex;

static BLANK_RUNS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Converts normalized HTML to markdown with ATX headings, fenced code and
/// pipe tables.
pub fn to_markdown(normalized_html: &str) -> Result<String, std::io::Error> {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style"])
        .options(Options {
            heading_style: HeadingStyle::Atx,
            code_block_style: CodeBlockStyle::Fenced,
            ..Default::default()
        })
        .add_handler(vec!["th", "td"], table_cell)
        .add_handler(vec!["tr"], table_row)
        .add_handler(vec!["table"], table_block)
        .build();

    let markdown = converter.convert(normalized_html)?;
    Ok(tidy(&markdown))
}

/// One cell, flattened to a single line and terminated by its pipe.
fn table_cell(element: Element) -> Option<String> {
    let text = element
        .content
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|");
    Some(format!(" {text} |"))
}

fn table_row(element: Element) -> Option<String> {
    let cells = element.content.trim_end();
    if cells.is_empty() {
        return Some(String::new());
    }
    Some(format!("\n|{cells}\n"))
}

/// Assembles the rows into a GFM table, treating the first row as the header.
fn table_block(element: Element) -> Option<String> {
    let rows: Vec<&str> = element
        .content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('|'))
        .collect();
    let Some((header, body)) = rows.split_first() else {
        return Some(element.content.to_string());
    };

    let mut out = String::from("\n\n");
    out.push_str(header);
    out.push_str("\n|");
    out.push_str(&" --- |".repeat(column_count(header).max(1)));
    for row in body {
        out.push('\n');
        out.push_str(row);
    }
    out.push_str("\n\n");
    Some(out)
}

/// Unescaped pipes in a row, minus the leading one.
fn column_count(row: &str) -> usize {
    let mut pipes: usize = 0;
    let mut escaped = false;
    for ch in row.chars() {
        match ch {
            '\\' => escaped = !escaped,
            '|' => {
                if !escaped {
                    pipes += 1;
                }
                escaped = false;
            }
            _ => escaped = false,
        }
    }
    pipes.saturating_sub(1)
}

/// Collapses blank-line runs outside fenced code and ends non-empty output
/// with one newline. Fenced code is kept byte for byte.
fn tidy(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut prose = String::new();
    let mut fence: Option<&str> = None;

    for line in markdown.split_inclusive('\n') {
        match fence {
            Some(open) => {
                out.push_str(line);
                if closes_fence(line, open) {
                    fence = None;
                }
            }
            None => match fence_marker(line) {
                Some(open) => {
                    flush_prose(&mut out, &prose);
                    prose.clear();
                    out.push_str(line);
                    fence = Some(open);
                }
                None => prose.push_str(line),
            },
        }
    }
    flush_prose(&mut out, &prose);

    let trimmed = out.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

/// Appends `prose` with blank runs collapsed, including a run that starts on
/// the line break already at the end of `out`.
fn flush_prose(out: &mut String, prose: &str) {
    let collapsed = BLANK_RUNS_RE.replace_all(prose, "\n\n");
    let rest = collapsed.trim_start_matches('\n');
    if out.ends_with('\n') && rest.len() < collapsed.len() {
        out.push('\n');
        out.push_str(rest);
    } else {
        out.push_str(&collapsed);
    }
}

/// The run of backticks or tildes opening a fenced block, if `line` opens one.
fn fence_marker(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let symbol = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = line.chars().take_while(|c| *c == symbol).count();
    (len >= 3).then(|| &line[..len])
}

fn closes_fence(line: &str, open: &str) -> bool {
    let line = line.trim();
    let Some(symbol) = open.chars().next() else {
        return false;
    };
    line.len() >= open.len() && line.chars().all(|c| c == symbol)
}
