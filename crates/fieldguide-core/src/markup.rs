//! HTML fragments embedded into table cells.

const TAG_BUTTON_OPEN: &str = "<button class=\"btn btn-light btn-xs\" onclick=\"insertText(this)\" style=\"padding: 1px; margin: 4px 2px; font-size: 12px;\">";

/// Escapes text for element content and double-quoted attribute values.
pub fn escape_html(text: &str) -> String {
    text.chars()
        .fold(String::with_capacity(text.len()), |mut escaped, ch| {
            match ch {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#39;"),
                _ => escaped.push(ch),
            }
            escaped
        })
}

/// `<a href="{href}">{label}</a>`. `label` is plain text.
pub fn hyperlink(href: &str, label: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape_html(href), escape_html(label))
}

/// One clickable tag button per non-empty tag of a comma-joined tag string.
pub fn tag_buttons(tags: &str) -> String {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("{}{}</button>", TAG_BUTTON_OPEN, escape_html(t)))
        .collect()
}

pub fn image_tag(src: &str, width: u32) -> String {
    format!("<img src=\"{}\" width=\"{}\">", escape_html(src), width)
}

/// Lower-cased, whitespace-split, hyphen-joined anchor fragment.
pub fn slugify(tag: &str) -> String {
    tag.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
