//! Console rendering: panels, the memory table, prompts.
//!
//! Everything returns a `String` so the session decides where it goes.

use crate::commands::SlashCommand;
use crate::memory::MemoryRecord;
use crossterm::style::{Color, Stylize};
use unicode_width::UnicodeWidthStr;

/// Semantic colors, ANSI only for terminal compatibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Danger,
    Info,
}

impl Tone {
    pub fn color(&self) -> Color {
        match self {
            Tone::Success => Color::Green,
            Tone::Warning => Color::Yellow,
            Tone::Danger => Color::Red,
            Tone::Info => Color::Cyan,
        }
    }
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

/// Bordered box around `body`, with an optional title in the top border.
pub fn panel(body: &str, title: Option<&str>, tone: Tone) -> String {
    let color = tone.color();
    let lines: Vec<&str> = body.lines().collect();
    let title_width = title.map(|t| t.width() + 2).unwrap_or(0);
    let inner = lines
        .iter()
        .map(|l| l.width())
        .max()
        .unwrap_or(0)
        .max(title_width)
        + 2;

    let mut out = String::new();
    match title {
        Some(title) => {
            let label = format!(" {title} ");
            let left = (inner - label.width()) / 2;
            let right = inner - label.width() - left;
            out.push_str(&format!(
                "{}{}{}\n",
                format!("╭{}", "─".repeat(left)).with(color),
                label.bold(),
                format!("{}╮", "─".repeat(right)).with(color),
            ));
        }
        None => {
            out.push_str(&format!("{}\n", format!("╭{}╮", "─".repeat(inner)).with(color)));
        }
    }
    for line in &lines {
        out.push_str(&format!(
            "{} {} {}\n",
            "│".with(color),
            pad(line, inner - 2),
            "│".with(color)
        ));
    }
    out.push_str(&format!("{}", format!("╰{}╯", "─".repeat(inner)).with(color)));
    out
}

/// Plain table with a title line and box-drawing rules.
pub fn table(title: &str, headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.width());
            }
        }
    }

    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{left}{}{right}", segments.join(mid))
    };
    let render_row = |cells: Vec<String>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!(" {} ", pad(cell, *w)))
            .collect();
        format!("│{}│", padded.join("│"))
    };

    let mut out = vec![
        format!("{}", title.italic()),
        rule("┌", "┬", "┐"),
        format!(
            "{}",
            render_row(headers.iter().map(|h| h.to_string()).collect()).bold()
        ),
        rule("├", "┼", "┤"),
    ];
    for row in rows {
        out.push(render_row(row.clone()));
    }
    out.push(rule("└", "┴", "┘"));
    out.join("\n")
}

/// The `/mem` listing.
pub fn memory_table(records: &[MemoryRecord]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.category.to_string(),
                if r.pinned { "✅".to_string() } else { String::new() },
                r.content.clone(),
            ]
        })
        .collect();
    table("Memories (latest)", &["ID", "Cat", "Pinned", "Content"], &rows)
}

pub fn help_panel() -> String {
    let width = SlashCommand::all()
        .iter()
        .map(|c| c.usage().width())
        .max()
        .unwrap_or(0)
        .max("exit".len())
        + 4;

    let mut lines = vec!["Commands".to_string()];
    for cmd in SlashCommand::all() {
        lines.push(format!("{}{}", pad(cmd.usage(), width), cmd.description()));
    }
    lines.push(format!("{}{}", pad("exit", width), "Quit"));
    panel(&lines.join("\n"), Some("Alice Controls"), Tone::Warning)
}

pub fn user_prompt() -> String {
    format!("{}", "You> ".cyan().bold())
}

pub fn assistant_prefix() -> String {
    format!("{}", "Alice> ".green().bold())
}

/// `Usage: /pin <cat>|<text>` style line
pub fn usage_line(usage: &str) -> String {
    format!("{} {}", "Usage:".red(), usage)
}

pub fn error_line(message: &str) -> String {
    format!("{}", message.red())
}

/// Dimmed text, used for `<think>` content
pub fn dim(text: &str) -> String {
    format!("{}", text.dim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Category;
    use chrono::Utc;

    #[test]
    fn test_panel_contains_body_and_title() {
        let out = panel("Deleted 4", Some("Memory"), Tone::Danger);
        assert!(out.contains("Deleted 4"));
        assert!(out.contains("Memory"));
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn test_panel_multiline() {
        let out = panel("one\ntwo\nthree", None, Tone::Info);
        assert_eq!(out.lines().count(), 5);
    }

    #[test]
    fn test_memory_table_rows() {
        let records = vec![MemoryRecord {
            id: 12,
            category: Category::Identity,
            content: "Name: Alice.".to_string(),
            pinned: true,
            created_at: Utc::now(),
        }];
        let out = memory_table(&records);
        assert!(out.contains("Memories (latest)"));
        assert!(out.contains("12"));
        assert!(out.contains("identity"));
        assert!(out.contains("✅"));
        assert!(out.contains("Name: Alice."));
    }

    #[test]
    fn test_help_lists_every_command() {
        let out = help_panel();
        for cmd in SlashCommand::all() {
            assert!(out.contains(cmd.usage()), "missing {}", cmd.usage());
        }
        assert!(out.contains("exit"));
    }

    #[test]
    fn test_pad_uses_display_width() {
        assert_eq!(pad("✅", 4).width(), 4);
        assert_eq!(pad("abc", 2), "abc");
    }
}
