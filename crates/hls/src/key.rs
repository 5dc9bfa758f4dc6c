//! Encryption key descriptors from `#EXT-X-KEY` and `#EXT-X-SESSION-KEY`.

use std::fmt::Display;

use tracing::{debug, trace, warn};

use crate::attributes::{AttributeList, parse_attribute_list};

/// Length in bytes of an initialization vector.
pub const IV_LEN: usize = 16;

/// Classification of the `METHOD` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMethod {
    None,
    Aes128,
    SampleAes,
    Other(String),
}

impl KeyMethod {
    pub fn parse(method: &str) -> Self {
        match method {
            "NONE" => KeyMethod::None,
            "AES-128" => KeyMethod::Aes128,
            "SAMPLE-AES" => KeyMethod::SampleAes,
            other => KeyMethod::Other(other.to_string()),
        }
    }
}

impl Display for KeyMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyMethod::None => write!(f, "NONE"),
            KeyMethod::Aes128 => write!(f, "AES-128"),
            KeyMethod::SampleAes => write!(f, "SAMPLE-AES"),
            KeyMethod::Other(method) => write!(f, "{method}"),
        }
    }
}

/// An encryption key declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XKey {
    pub method: String,
    pub uri: String,
    pub iv: Option<[u8; IV_LEN]>,
    pub key_format: Option<String>,
    pub key_format_versions: Option<String>,
}

impl XKey {
    /// Build a key from the attributes of a key tag.
    ///
    /// Returns `None` when `METHOD` or `URI` is missing. An `IV` that is not
    /// `0x` followed by 32 hex digits is treated as absent.
    pub fn from_attributes(attributes: &AttributeList) -> Option<Self> {
        let (Some(method), Some(uri)) = (attributes.get("METHOD"), attributes.get("URI")) else {
            if attributes.get("METHOD") == Some("NONE") {
                trace!("Key declaration clears encryption");
                return None;
            }
            warn!(
                has_method = attributes.contains_key("METHOD"),
                has_uri = attributes.contains_key("URI"),
                "Dropping key declaration without METHOD or URI"
            );
            return None;
        };

        let iv = attributes.get("IV").and_then(|raw| {
            let decoded = decode_iv(raw);
            if decoded.is_none() {
                debug!(iv = raw, "Ignoring IV that is not a 16 byte hex value");
            }
            decoded
        });

        Some(Self {
            method: method.to_string(),
            uri: uri.to_string(),
            iv,
            key_format: attributes.get("KEYFORMAT").map(str::to_string),
            key_format_versions: attributes.get("KEYFORMATVERSIONS").map(str::to_string),
        })
    }

    /// Tokenize an attribute payload and build a key from it.
    pub fn parse(payload: &str) -> Option<Self> {
        Self::from_attributes(&parse_attribute_list(payload))
    }

    pub fn key_method(&self) -> KeyMethod {
        KeyMethod::parse(&self.method)
    }

    pub fn iv(&self) -> Option<&[u8; IV_LEN]> {
        self.iv.as_ref()
    }
}

/// Decode a `0x`-prefixed, 32 digit hex string into an IV.
pub fn decode_iv(raw: &str) -> Option<[u8; IV_LEN]> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))?;
    if digits.len() != IV_LEN * 2 {
        return None;
    }

    let mut iv = [0u8; IV_LEN];
    hex::decode_to_slice(digits, &mut iv).ok()?;
    Some(iv)
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    const IV_BYTES: [u8; IV_LEN] = [
        0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD,
        0xEF,
    ];

    #[test]
    fn test_decode_iv() {
        assert_eq!(
            decode_iv("0x0123456789ABCDEF0123456789ABCDEF"),
            Some(IV_BYTES)
        );
        assert_eq!(
            decode_iv("0X0123456789abcdef0123456789abcdef"),
            Some(IV_BYTES)
        );
    }

    #[test]
    fn test_decode_iv_rejects_bad_shapes() {
        // 16 hex digits, the classic short example
        assert_eq!(decode_iv("0x0123456789ABCDEF"), None);
        // one digit too many
        assert_eq!(decode_iv("0x0123456789ABCDEF0123456789ABCDEF0"), None);
        // missing prefix
        assert_eq!(decode_iv("0123456789ABCDEF0123456789ABCDEF"), None);
        // not hex
        assert_eq!(decode_iv("0x0123456789ABCDEF0123456789ABCDEG"), None);
        assert_eq!(decode_iv(""), None);
    }

    #[test]
    fn test_session_key() {
        let key = XKey::parse(
            r#"METHOD=SAMPLE-AES,URI="skd://twelve",KEYFORMAT="com.apple.streamingkeydelivery",KEYFORMATVERSIONS="1""#,
        )
        .unwrap();
        assert_eq!(key.method, "SAMPLE-AES");
        assert_eq!(key.key_method(), KeyMethod::SampleAes);
        assert_eq!(key.uri, "skd://twelve");
        assert_eq!(key.iv, None);
        assert_eq!(
            key.key_format.as_deref(),
            Some("com.apple.streamingkeydelivery")
        );
        assert_eq!(key.key_format_versions.as_deref(), Some("1"));
    }

    #[test]
    fn test_aes_key_with_iv() {
        let key = XKey::parse(
            r#"METHOD=AES-128,URI="https://my-host/?foo=bar",IV=0x0123456789ABCDEF0123456789ABCDEF"#,
        )
        .unwrap();
        assert_eq!(key.key_method(), KeyMethod::Aes128);
        assert_eq!(key.uri, "https://my-host/?foo=bar");
        assert_eq!(key.iv(), Some(&IV_BYTES));
    }

    #[test]
    fn test_short_iv_is_absent() {
        let key =
            XKey::parse(r#"METHOD=AES-128,URI="https://my-host/?foo=bar",IV=0x0123456789ABCDEF"#)
                .unwrap();
        assert_eq!(key.iv, None);
    }

    #[test]
    fn test_missing_required_attributes() {
        assert_eq!(XKey::parse(r#"URI="key.bin""#), None);
        assert_eq!(XKey::parse("METHOD=AES-128"), None);
        assert_eq!(XKey::parse(""), None);
    }

    #[test]
    fn test_key_method_display() {
        let cases = [
            (KeyMethod::parse("NONE"), "NONE"),
            (KeyMethod::parse("AES-128"), "AES-128"),
            (KeyMethod::parse("SAMPLE-AES"), "SAMPLE-AES"),
            (KeyMethod::parse("SAMPLE-AES-CTR"), "SAMPLE-AES-CTR"),
        ];
        for (method, expected) in cases {
            assert_eq!(method.to_string(), expected);
        }
    }
}
