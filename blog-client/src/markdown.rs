//! Упрощённый построчный рендер markdown в HTML.
//!
//! Поддерживаются заголовки `#`..`###`, списки `- `/`* `, блоки кода в
//! тройных обратных кавычках, цитаты `> ` и абзацы с `**жирным**`,
//! `*курсивом*` и `` `кодом` ``. Весь пользовательский текст экранируется.

use std::sync::LazyLock;

use regex::Regex;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("Invalid bold regex"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("Invalid italic regex"));
static CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`(.*?)`").expect("Invalid code regex"));

const FENCE: &str = "```";

/// Рендерит текст поста в HTML-фрагмент; пустые строки пропускаются.
pub fn render_html(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut out = String::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if let Some(text) = line.strip_prefix("# ") {
            push_tag(&mut out, "h1", &escape_html(text));
        } else if let Some(text) = line.strip_prefix("## ") {
            push_tag(&mut out, "h2", &escape_html(text));
        } else if let Some(text) = line.strip_prefix("### ") {
            push_tag(&mut out, "h3", &escape_html(text));
        } else if list_item(line).is_some() {
            out.push_str("<ul>");
            while let Some(item) = lines.get(i).and_then(|l| list_item(l.trim())) {
                push_tag(&mut out, "li", &escape_html(item));
                i += 1;
            }
            out.push_str("</ul>\n");
            continue;
        } else if line.starts_with(FENCE) {
            let start = i + 1;
            let mut end = start;
            while end < lines.len() && !lines[end].trim().starts_with(FENCE) {
                end += 1;
            }
            let code = lines[start..end].join("\n");
            out.push_str("<pre><code>");
            out.push_str(&escape_html(&code));
            out.push_str("</code></pre>\n");
            // closing fence
            i = end + 1;
            continue;
        } else if let Some(text) = line.strip_prefix("> ") {
            out.push_str("<blockquote><p>");
            out.push_str(&escape_html(text));
            out.push_str("</p></blockquote>\n");
        } else if !line.is_empty() {
            push_tag(&mut out, "p", &render_inline(line));
        }

        i += 1;
    }

    out
}

fn list_item(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

fn push_tag(out: &mut String, tag: &str, inner: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(inner);
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

fn render_inline(line: &str) -> String {
    let escaped = escape_html(line);
    let bold = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    let italic = ITALIC.replace_all(&bold, "<em>$1</em>");
    CODE.replace_all(&italic, "<code>$1</code>").into_owned()
}

/// Экранирует `& < > " '`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_by_level() {
        let html = render_html("# One\n## Two\n### Three");
        assert_eq!(html, "<h1>One</h1>\n<h2>Two</h2>\n<h3>Three</h3>\n");
    }

    #[test]
    fn consecutive_list_items_share_one_list() {
        let html = render_html("- a\n* b\n\n- c");
        assert_eq!(
            html,
            "<ul><li>a</li>\n<li>b</li>\n</ul>\n<ul><li>c</li>\n</ul>\n"
        );
    }

    #[test]
    fn fenced_code_is_verbatim_and_escaped() {
        let html = render_html("```rust\n  let x = **1** < 2;\n```\nafter");
        assert_eq!(
            html,
            "<pre><code>  let x = **1** &lt; 2;</code></pre>\n<p>after</p>\n"
        );
    }

    #[test]
    fn unclosed_fence_runs_to_end() {
        let html = render_html("```\ncode\nmore");
        assert_eq!(html, "<pre><code>code\nmore</code></pre>\n");
    }

    #[test]
    fn blockquote_and_blank_lines() {
        let html = render_html("\n> quoted\n\n");
        assert_eq!(html, "<blockquote><p>quoted</p></blockquote>\n");
    }

    #[test]
    fn inline_emphasis_and_code() {
        let html = render_html("a **b** *c* `d`");
        assert_eq!(
            html,
            "<p>a <strong>b</strong> <em>c</em> <code>d</code></p>\n"
        );
    }

    #[test]
    fn markup_in_text_is_escaped() {
        let html = render_html("<script>alert('x')</script>");
        assert_eq!(
            html,
            "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;</p>\n"
        );
    }

    #[test]
    fn lines_are_trimmed_before_matching() {
        let html = render_html("   # Title  ");
        assert_eq!(html, "<h1>Title</h1>\n");
    }
}
