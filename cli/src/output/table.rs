//! Plain-text table rendering
//!
//! Columns are sized by display width so tables stay aligned when cells
//! carry non-ASCII titles, which astronomical catalogs routinely do.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest a single column may grow before cells are ellipsized
const MAX_COL_WIDTH: usize = 48;

/// Render rows as an aligned table with a header rule
pub fn render<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.as_ref().width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.width());
        }
    }
    for width in &mut widths {
        *width = (*width).min(MAX_COL_WIDTH);
    }

    let mut out = String::new();
    push_row(&mut out, headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

/// Render and print
pub fn print<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>]) {
    print!("{}", render(headers, rows));
}

fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(|c| c.as_ref()).unwrap_or("");
        let cell = truncate(cell, *width);
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(&cell);
        if i + 1 < widths.len() {
            let pad = width.saturating_sub(cell.width());
            out.push_str(&" ".repeat(pad));
        }
    }
    out.push('\n');
}

/// Cut a cell to the given display width, ellipsizing when needed
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= 3 {
        return text.chars().take(max_width).collect();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 3 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str("...");
    out
}
