//! Item normalization.
//!
//! Turns parser output into [`FeedItem`]s: plain-text titles, escaped
//! permalinks and descriptions carrying a source attribution line.
//! Normalization never fails; unusable fragments become empty strings.

use crate::rss::types::{FeedItem, RawItem};

/// Elements whose content is dropped along with their tags.
const DROPPED_ELEMENTS: &[&str] = &["script", "style"];

/// Normalize a raw item fetched from `source_url`.
pub fn normalize(raw: RawItem, source_url: &str) -> FeedItem {
    let title = raw.title.as_deref().map(strip_html).unwrap_or_default();
    let permalink = raw.permalink.as_deref().map(escape_url).unwrap_or_default();
    let description = raw.description.unwrap_or_default();

    let mut body = description.clone();
    body.push_str(&source_attribution(&permalink));

    FeedItem {
        title,
        permalink,
        description,
        body,
        source_url: source_url.to_string(),
    }
}

/// The attribution line appended to every synced body.
pub fn source_attribution(permalink: &str) -> String {
    let escaped = escape_html(permalink);
    format!(
        "<p>Source: <a href=\"{}\" target=\"_blank\">{}</a></p>",
        escaped, escaped
    )
}

/// Validate and escape a permalink.
///
/// Only absolute http(s) URLs survive. The trimmed input is kept as written
/// apart from percent-encoding unsafe characters, so distinct permalinks stay
/// distinct identity keys. Anything else yields an empty string.
pub fn escape_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match url::Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            percent_encode_unsafe(trimmed)
        }
        _ => String::new(),
    }
}

/// Percent-encode bytes that may not appear literally in a URL.
fn percent_encode_unsafe(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if is_url_safe(ch) {
            out.push(ch);
            continue;
        }
        let mut buf = [0u8; 4];
        for byte in ch.encode_utf8(&mut buf).bytes() {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

fn is_url_safe(ch: char) -> bool {
    ch.is_ascii_graphic() && !matches!(ch, '"' | '<' | '>' | '\\' | '^' | '`' | '{' | '|' | '}')
}

/// Escape text for use in HTML content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Strip all markup, leaving plain text.
///
/// Entities are decoded first so escaped markup is stripped like literal
/// markup. A `<` opens a tag only when followed by a letter, `/`, `!` or `?`;
/// any other `<` is text. `<script>` and `<style>` lose their content too,
/// and whitespace runs collapse to one space.
pub fn strip_html(html: &str) -> String {
    let decoded = decode_entities(html);
    let mut result = String::with_capacity(decoded.len());
    let mut rest = decoded.as_str();

    while let Some(start) = find_tag_start(rest) {
        result.push_str(&rest[..start]);
        let after = &rest[start..];
        let Some(end) = after.find('>') else {
            // Unterminated tag: drop the remainder.
            rest = "";
            break;
        };
        let tag = &after[1..end];
        rest = &after[end + 1..];

        if let Some(name) = dropped_element(tag) {
            let closing = format!("</{}", name);
            rest = match find_ascii_ci(rest, &closing) {
                Some(pos) => match rest[pos..].find('>') {
                    Some(gt) => &rest[pos + gt + 1..],
                    None => "",
                },
                None => "",
            };
        }
        // Tags act as word boundaries.
        result.push(' ');
    }
    result.push_str(rest);

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Byte offset of the next `<` that opens a tag.
fn find_tag_start(text: &str) -> Option<usize> {
    text.match_indices('<')
        .map(|(i, _)| i)
        .find(|&i| {
            text[i + 1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
        })
}

/// Name of the dropped element opened by `tag`, if any.
fn dropped_element(tag: &str) -> Option<&'static str> {
    let name: String = tag
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    DROPPED_ELEMENTS.iter().copied().find(|e| *e == name)
}

/// Case-insensitive ASCII substring search.
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}

/// Decode named and numeric entities. Unknown entities are kept verbatim.
fn decode_entities(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after
            .char_indices()
            .take(12)
            .find(|(_, c)| *c == ';')
            .map(|(i, _)| i);

        let decoded = semi.and_then(|semi| decode_entity(&after[..semi]).map(|c| (c, semi)));
        match decoded {
            Some((ch, semi)) => {
                result.push(ch);
                rest = &after[semi + 1..];
            }
            None => {
                result.push('&');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
