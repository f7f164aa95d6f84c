/// The two render modes spec.md §4.8 names, each with its own escape set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Html,
    Markdown,
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RenderMode::Html => "html",
            RenderMode::Markdown => "markdown",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(RenderMode::Html),
            "markdown" | "md" => Ok(RenderMode::Markdown),
            other => Err(format!("unknown render mode: {other}")),
        }
    }
}

/// `&`, `<`, `>` at minimum; `"` for attribute-safe text too.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// MarkdownV2-shaped escape set per spec.md §4.8: `_*[]()~\`>#+-=|{}.!`.
fn escape_markdown(text: &str) -> String {
    const SPECIAL: &[char] = &[
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    ];
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn escape(mode: RenderMode, text: &str) -> String {
    match mode {
        RenderMode::Html => escape_html(text),
        RenderMode::Markdown => escape_markdown(text),
    }
}

/// Renders a hyperlink in the given mode, escaping the label but passing
/// the URL through unescaped in Markdown mode (its own delimiter set
/// doesn't include `/` or `:`) and attribute-escaping it in HTML mode.
pub fn link(mode: RenderMode, label: &str, url: &str) -> String {
    match mode {
        RenderMode::Html => format!(r#"<a href="{}">{}</a>"#, escape_html(url), escape_html(label)),
        RenderMode::Markdown => format!("[{}]({})", escape_markdown(label), url),
    }
}

pub fn bold(mode: RenderMode, text: &str) -> String {
    match mode {
        RenderMode::Html => format!("<b>{}</b>", escape_html(text)),
        RenderMode::Markdown => format!("*{}*", escape_markdown(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escapes_angle_brackets_and_amp() {
        assert_eq!(escape(RenderMode::Html, "A & B <tag>"), "A &amp; B &lt;tag&gt;");
    }

    #[test]
    fn markdown_escapes_special_characters() {
        assert_eq!(escape(RenderMode::Markdown, "1. Win!"), "1\\. Win\\!");
    }

    #[test]
    fn render_mode_round_trips() {
        for m in [RenderMode::Html, RenderMode::Markdown] {
            assert_eq!(m.to_string().parse::<RenderMode>().unwrap(), m);
        }
    }

    #[test]
    fn link_escapes_label_not_raw_url_in_markdown() {
        let rendered = link(RenderMode::Markdown, "Zenit!", "https://site.ru/a?x=1");
        assert_eq!(rendered, "[Zenit\\!](https://site.ru/a?x=1)");
    }
}
