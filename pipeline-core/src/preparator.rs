//! Preparator (spec §4.7): Markdown-V2 normalization of the delivery text.

use pipeline_common::Result;
use pipeline_store::ToPublishRepo;
use regex::Regex;

const BATCH_SIZE: i64 = 10;
const SPECIAL_CHARS: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '<', '&', '#', '+', '-', '=', '|', '{',
    '}', '.', '!',
];

#[derive(Clone)]
pub struct Preparator {
    to_publish: ToPublishRepo,
    subscribe_url: String,
}

impl Preparator {
    pub fn new(to_publish: ToPublishRepo, subscribe_url: String) -> Self {
        Self {
            to_publish,
            subscribe_url,
        }
    }

    pub async fn run_once(&self) -> Result<usize> {
        let rows = self.to_publish.fetch_prepare_false(BATCH_SIZE).await?;
        for row in &rows {
            let prepared = parse_and_prepare(&row.text, &self.subscribe_url);
            self.to_publish.update_prepared(row.id, prepared.as_deref()).await?;
        }
        Ok(rows.len())
    }
}

fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL_CHARS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn clean_component(value: &str) -> String {
    value
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wraps each paragraph (blank-line separated) as a `>`-prefixed block quote.
fn paragraph_quote(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let paragraphs: Vec<String> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|para| {
            let lines: Vec<String> = para
                .split('\n')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| format!(">{l}"))
                .collect();
            lines.join("\n>")
        })
        .collect();
    paragraphs.join("\n>\n")
}

/// Splits on the literal `1111` delimiter into 2 parts (`original, link`) or
/// 4 parts (`original, link, title, output`), escapes Markdown-V2 specials,
/// wraps an optional title+output block as a block-quote, and appends the
/// original/subscribe links. Returns `None` on an unrecognized part count or
/// blank input — the caller still marks the row processed without text.
fn parse_and_prepare(raw_text: &str, subscribe_url: &str) -> Option<String> {
    let trimmed = raw_text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let delimiter = Regex::new(r"1111\s*").expect("static delimiter regex");
    let parts: Vec<String> = delimiter
        .split(trimmed)
        .map(|p| clean_component(p.trim()))
        .collect();

    let (original, link, title, output) = match parts.as_slice() {
        [o, l] => (o.clone(), l.clone(), None, None),
        [o, l, t, out] => (o.clone(), l.clone(), Some(t.clone()), Some(out.clone())),
        _ => return None,
    };

    let original_escaped = escape_markdown(&original);

    let output_part = match output {
        Some(output) => {
            let combined = match title {
                Some(ref t) if !t.is_empty() => format!("{t}\n\n{output}"),
                _ => output,
            };
            paragraph_quote(&escape_markdown(&combined))
        }
        None => String::new(),
    };

    let mut text_parts = vec![original_escaped];
    if !output_part.is_empty() {
        text_parts.push(String::new());
        text_parts.push(output_part);
    }
    text_parts.push(String::new());
    text_parts.push(String::new());
    text_parts.push(format!("[Оригинал]({link})"));
    text_parts.push(format!("[Подписаться]({subscribe_url})"));

    Some(text_parts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_format_escapes_and_links() {
        let out = parse_and_prepare("Hello! (world)1111https://x", "https://t.me/news_anthology")
            .expect("should parse");
        assert!(out.starts_with("Hello\\! \\(world\\)"));
        assert!(out.ends_with("[Оригинал](https://x)\n[Подписаться](https://t.me/news_anthology)"));
    }

    #[test]
    fn long_format_quotes_title_and_output() {
        let raw = "Body text1111https://x1111Title1111Some\n\noutput";
        let out = parse_and_prepare(raw, "https://t.me/news_anthology").expect("should parse");
        assert!(out.contains(">Title"));
        assert!(out.contains(">Some"));
        assert!(out.contains(">output"));
    }

    #[test]
    fn unrecognized_part_count_returns_none() {
        assert!(parse_and_prepare("just one part", "https://t.me/x").is_none());
        assert!(parse_and_prepare("a1111b1111c", "https://t.me/x").is_none());
    }

    #[test]
    fn blank_text_returns_none() {
        assert!(parse_and_prepare("   ", "https://t.me/x").is_none());
    }
}
