//! Attribute-list tokenizer for tags such as `#EXT-X-STREAM-INF` and `#EXT-X-KEY`.
//!
//! An attribute list is a comma separated run of `KEY=VALUE` pairs where a
//! value may be a double-quoted string. Commas and `=` inside quotes belong to
//! the value:
//!
//! ```
//! use hls_manifest::attributes::parse_attribute_list;
//!
//! let attrs = parse_attribute_list(r#"BANDWIDTH=1280000,CODECS="avc1.4d401f,mp4a.40.2""#);
//! assert_eq!(attrs.get("BANDWIDTH"), Some("1280000"));
//! assert_eq!(attrs.get("CODECS"), Some("avc1.4d401f,mp4a.40.2"));
//! ```

use std::collections::HashMap;

use tracing::trace;

/// Parsed attributes of a single tag line. Keys are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList {
    attributes: HashMap<String, String>,
}

impl AttributeList {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Integer value of `key`, `None` when missing or not an integer.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Tokenize the payload of an attribute tag (the text after `TAG:`).
///
/// Tokens that do not split into exactly one key and one value are dropped.
pub fn parse_attribute_list(input: &str) -> AttributeList {
    let mut attributes = HashMap::new();

    for token in split_unquoted(input, ',') {
        let parts = split_unquoted(token, '=');
        let [key, value] = parts.as_slice() else {
            if !token.trim().is_empty() {
                trace!(token, "Dropping malformed attribute");
            }
            continue;
        };

        let key = key.trim().trim_matches('"');
        if key.is_empty() {
            trace!(token, "Dropping attribute with empty key");
            continue;
        }
        let value = unescape(unquote(value.trim()));
        attributes.insert(key.to_string(), value);
    }

    AttributeList { attributes }
}

/// Split `input` on `separator`, ignoring separators inside a double-quoted span.
///
/// Inside quotes a backslash escapes the following character, so `\"` does not
/// close the span.
fn split_unquoted(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            c if c == separator && !in_quotes => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Strip one pair of surrounding double quotes, if present.
fn unquote(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

/// Resolve backslash escapes (`\0 \t \n \r \" \' \\`). Unknown escapes are kept verbatim.
pub fn unescape(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('\0'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
