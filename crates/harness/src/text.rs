//! UI text normalization and test-input decoding
//!
//! Table cells and toasts come back decorated with HTML entities and
//! incidental whitespace; comparisons must not produce false negatives
//! because of them. Report text goes the other way: the sink escapes it
//! once at the boundary so raw UI strings can never break the document.

/// Trim and HTML-decode a UI string for comparison.
pub fn normalize(raw: &str) -> String {
    decode_entities(raw).trim().to_string()
}

/// Case-insensitive equality over normalized text.
pub fn eq_norm(a: &str, b: &str) -> bool {
    normalize(a).eq_ignore_ascii_case(&normalize(b))
}

/// Escape text for embedding in the HTML report.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode the entities the application actually emits, plus numeric forms.
pub fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find(';') {
            // Entities are short; anything longer is just literal text.
            Some(end) if end <= 10 => {
                let entity = &tail[1..end];
                match decode_entity(entity) {
                    Some(decoded) => out.push(decoded),
                    None => out.push_str(&tail[..=end]),
                }
                rest = &tail[end + 1..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
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
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Expand scenario-input placeholders: `{DQ}` is a double quote, `{EQ:n}`
/// is a run of n equals signs. Security payloads use these to survive the
/// scenario table format.
pub fn decode_placeholders(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find('}') {
            Some(end) => {
                let token = &tail[1..end];
                if token == "DQ" {
                    out.push('"');
                } else if let Some(n) = token
                    .strip_prefix("EQ:")
                    .and_then(|n| n.parse::<usize>().ok())
                {
                    out.extend(std::iter::repeat('=').take(n));
                } else {
                    out.push_str(&tail[..=end]);
                }
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_decodes() {
        assert_eq!(normalize("  C&#43;&#43;  "), "C++");
        assert_eq!(normalize("Caf&eacute;"), "Caf&eacute;");
        assert_eq!(normalize("Fish &amp; Chips"), "Fish & Chips");
        assert_eq!(normalize("R&amp;D&nbsp;"), "R&D");
    }

    #[test]
    fn eq_norm_is_case_insensitive() {
        assert!(eq_norm("FRENCH", "french"));
        assert!(eq_norm(" Spanish ", "spanish"));
        assert!(eq_norm("A&amp;B", "a&b"));
        assert!(!eq_norm("French", "German"));
    }

    #[test]
    fn escape_round_trips_through_decode() {
        let raw = r#"<script>alert("x")</script> & 'quotes'"#;
        assert_eq!(decode_entities(&escape(raw)), raw);
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(escape("<b>"), "&lt;b&gt;");
        assert!(!escape(r#"<img src=x onerror="1">"#).contains('<'));
    }

    #[test]
    fn numeric_entities_decode() {
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("&#notanumber;"), "&#notanumber;");
    }

    #[test]
    fn stray_ampersands_pass_through() {
        assert_eq!(decode_entities("a & b"), "a & b");
        assert_eq!(decode_entities("trailing &"), "trailing &");
    }

    #[test]
    fn placeholders_expand() {
        assert_eq!(decode_placeholders("{DQ}onmouseover{EQ:1}alert(1){DQ}"), "\"onmouseover=alert(1)\"");
        assert_eq!(decode_placeholders("{EQ:3}"), "===");
        assert_eq!(decode_placeholders("plain text"), "plain text");
        assert_eq!(decode_placeholders("{unknown} stays"), "{unknown} stays");
    }
}
