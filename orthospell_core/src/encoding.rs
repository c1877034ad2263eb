//! Character encodings of dictionary files.
//!
//! The `SET` command declares how the bytes of both files are encoded; the
//! default is ISO-8859-1. Everything is converted to UTF-8 at load time.

use crate::error::ParseErrorKind;

/// A validated, normalized encoding name from a `SET` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    name: String,
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding {
            name: "ISO8859-1".to_string(),
        }
    }
}

impl Encoding {
    pub fn new(name: &str) -> Result<Encoding, ParseErrorKind> {
        let normalized = normalize_name(name);
        if normalized != "UTF-8" && lookup(&normalized).is_none() {
            return Err(ParseErrorKind::InvalidEncoding);
        }
        Ok(Encoding { name: normalized })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_utf8(&self) -> bool {
        self.name == "UTF-8"
    }
}

fn normalize_name(name: &str) -> String {
    let mut n = name.to_ascii_uppercase();
    if n == "UTF8" {
        n = "UTF-8".to_string();
    } else if let Some(rest) = n.strip_prefix("MICROSOFT-") {
        n = rest.to_string();
    }
    n
}

/// Resolves a normalized name against the encodings the format allows.
/// ISO-8859-1 is handled by hand below because the WHATWG label of that
/// name actually selects windows-1252.
fn lookup(name: &str) -> Option<&'static encoding_rs::Encoding> {
    let label = match name {
        "ISO8859-1" | "ISO-8859-1" => return Some(encoding_rs::WINDOWS_1252), // placeholder, decode_latin1 is used
        "ISO8859-10" | "ISO-8859-10" => "iso-8859-10",
        "ISO8859-13" | "ISO-8859-13" => "iso-8859-13",
        "ISO8859-14" | "ISO-8859-14" => "iso-8859-14",
        "ISO8859-15" | "ISO-8859-15" => "iso-8859-15",
        _ => {
            if let Some(digit) = name.strip_prefix("ISO8859-") {
                return encoding_rs::Encoding::for_label(format!("iso-8859-{digit}").as_bytes());
            }
            name
        }
    };
    encoding_rs::Encoding::for_label(label.as_bytes())
}

/// Converts the raw bytes of one line (or token) to UTF-8.
#[derive(Debug, Clone)]
pub struct EncodingConverter {
    name: String,
}

impl EncodingConverter {
    pub fn new(enc: &Encoding) -> Self {
        EncodingConverter {
            name: enc.name().to_string(),
        }
    }

    /// Returns `None` when the bytes are not valid in the declared encoding.
    pub fn to_utf8(&self, bytes: &[u8]) -> Option<String> {
        match self.name.as_str() {
            "UTF-8" => std::str::from_utf8(bytes).ok().map(str::to_string),
            "ISO8859-1" | "ISO-8859-1" => {
                Some(bytes.iter().map(|&b| char::from(b)).collect())
            }
            name => {
                let enc = lookup(name)?;
                let (out, _, had_errors) = enc.decode(bytes);
                if had_errors {
                    None
                } else {
                    Some(out.into_owned())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_normalized() {
        assert_eq!(Encoding::new("utf8").unwrap().name(), "UTF-8");
        assert_eq!(Encoding::new("UTF-8").unwrap().name(), "UTF-8");
        assert_eq!(
            Encoding::new("microsoft-cp1251").unwrap().name(),
            "CP1251"
        );
        assert!(Encoding::new("EBCDIC-FI").is_err());
    }

    #[test]
    fn latin1_decodes_every_byte() {
        let conv = EncodingConverter::new(&Encoding::default());
        assert_eq!(conv.to_utf8(b"caf\xe9").unwrap(), "café");
    }

    #[test]
    fn latin2_decodes() {
        let enc = Encoding::new("ISO8859-2").unwrap();
        let conv = EncodingConverter::new(&enc);
        // 0xB9 is š in latin-2
        assert_eq!(conv.to_utf8(b"ko\xb9").unwrap(), "koš");
    }

    #[test]
    fn koi8_and_cp1251_resolve() {
        assert!(Encoding::new("KOI8-R").is_ok());
        assert!(Encoding::new("cp1251").is_ok());
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let enc = Encoding::new("UTF-8").unwrap();
        let conv = EncodingConverter::new(&enc);
        assert!(conv.to_utf8(b"\xff\xfe").is_none());
    }
}
