// 🏷️ Node labels - header text and body detail lines
//
// Pure formatting: nothing here knows about coordinates or surfaces, so the
// truncation and field-selection rules can be checked on their own.

use crate::config::RenderConfig;
use crate::normalize::{text, DisplayNode};

/// One "Label: value" line in a node body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLine {
    pub label: &'static str,
    pub value: String,
}

impl DetailLine {
    pub fn text(&self) -> String {
        format!("{}: {}", self.label, self.value)
    }
}

/// First `max` characters of `s` (characters, not bytes)
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub fn header_text(node: &DisplayNode<'_>, config: &RenderConfig) -> String {
    truncate_chars(&node.name, config.name_max_chars)
}

/// Keep the first and last four characters of an account number
///
/// Example: "DE89 3704 0044 0532 0130 00" → "DE89****3000"
pub fn mask_account_number(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let n = chars.len();
    if n <= 4 {
        return chars.into_iter().collect();
    }
    let tail: String = chars[n - 4..].iter().collect();
    if n <= 8 {
        return format!("****{}", tail);
    }
    let head: String = chars[..4].iter().collect();
    format!("{}****{}", head, tail)
}

/// Number of detail lines that fit below the header
pub fn body_line_capacity(config: &RenderConfig) -> usize {
    let first = config.header_height + config.detail_top_padding;
    let bottom = config.node_height - BOTTOM_PADDING;
    if config.detail_line_height <= 0.0 || first > bottom {
        return 0;
    }
    ((bottom - first) / config.detail_line_height).floor() as usize + 1
}

/// Space kept free under the last baseline
pub const BOTTOM_PADDING: f64 = 4.0;

/// Detail lines for `node`: fields picked by category, absent values skipped
/// without leaving a gap, each value truncated, at most as many as fit.
pub fn detail_lines(node: &DisplayNode<'_>, config: &RenderConfig) -> Vec<DetailLine> {
    let limit = config.max_detail_lines.min(body_line_capacity(config));

    node.category
        .detail_fields()
        .iter()
        .filter_map(|field| {
            let raw = field.keys.iter().find_map(|key| text(node.data, key))?;
            let value = if field.masked {
                mask_account_number(&raw)
            } else {
                raw
            };
            Some(DetailLine {
                label: field.label,
                value: truncate_chars(&value, config.value_max_chars),
            })
        })
        .take(limit)
        .collect()
}
