//! Text decoding by trial: the first encoding in priority order that decodes
//! the whole buffer wins.
//!
//! Success only proves the bytes are *valid* in that encoding, not that it is
//! the right one, so every guess carries a confidence the caller can act on
//! (or override).

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ReadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TextEncoding {
    /// UTF-8 with a byte-order mark, which is stripped.
    #[serde(rename = "utf-8-sig")]
    Utf8Sig,
    #[serde(rename = "utf-8")]
    Utf8,
    /// Single-byte fallback; every byte sequence decodes.
    #[serde(rename = "windows-1252")]
    Windows1252,
}

/// Sniffing order.
pub const SNIFF_ORDER: [TextEncoding; 3] =
    [TextEncoding::Utf8Sig, TextEncoding::Utf8, TextEncoding::Windows1252];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8Sig => "utf-8-sig",
            Self::Utf8 => "utf-8",
            Self::Windows1252 => "windows-1252",
        }
    }

    /// Decode the whole buffer, or `None` if it is not valid in this encoding.
    pub fn decode(&self, raw: &[u8]) -> Option<String> {
        match self {
            Self::Utf8Sig => {
                let body = raw.strip_prefix(UTF8_BOM)?;
                encoding_rs::UTF_8
                    .decode_without_bom_handling_and_without_replacement(body)
                    .map(|s| s.into_owned())
            }
            Self::Utf8 => encoding_rs::UTF_8
                .decode_without_bom_handling_and_without_replacement(raw)
                .map(|s| s.into_owned()),
            Self::Windows1252 => {
                let (text, had_errors) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(raw);
                if had_errors {
                    None
                } else {
                    Some(text.into_owned())
                }
            }
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8-sig" | "utf8-sig" => Ok(Self::Utf8Sig),
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "windows-1252" | "cp1252" | "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Windows1252),
            other => Err(format!(
                "unknown encoding '{other}' (expected utf-8-sig, utf-8 or windows-1252)"
            )),
        }
    }
}

/// How much a decode result says about the real encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// A byte-order mark was present.
    Certain,
    /// Strict decode succeeded.
    Likely,
    /// Only the permissive fallback decoded the input.
    Fallback,
    /// Chosen by the caller, not sniffed.
    Override,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodingGuess {
    pub encoding: TextEncoding,
    pub confidence: Confidence,
    /// Encodings attempted, in order, ending with the one that succeeded.
    pub tried: Vec<TextEncoding>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText {
    pub text: String,
    pub guess: EncodingGuess,
}

/// Decode with the first encoding in [`SNIFF_ORDER`] that accepts the bytes.
pub fn sniff_encoding(raw: &[u8]) -> Result<DecodedText, ReadError> {
    let mut tried = Vec::with_capacity(SNIFF_ORDER.len());
    for encoding in SNIFF_ORDER {
        tried.push(encoding);
        if let Some(text) = encoding.decode(raw) {
            let confidence = match encoding {
                TextEncoding::Utf8Sig => Confidence::Certain,
                TextEncoding::Utf8 => Confidence::Likely,
                TextEncoding::Windows1252 => Confidence::Fallback,
            };
            log::debug!("decoded {} byte(s) as {encoding} ({confidence:?})", raw.len());
            return Ok(DecodedText {
                text,
                guess: EncodingGuess { encoding, confidence, tried },
            });
        }
    }
    Err(ReadError::UnreadableText { tried })
}

/// Decode with `forced` when given, otherwise sniff.
pub fn decode_text(raw: &[u8], forced: Option<TextEncoding>) -> Result<DecodedText, ReadError> {
    let Some(encoding) = forced else {
        return sniff_encoding(raw);
    };
    let text = encoding
        .decode(raw)
        .ok_or_else(|| ReadError::UnreadableText { tried: vec![encoding] })?;
    Ok(DecodedText {
        text,
        guess: EncodingGuess {
            encoding,
            confidence: Confidence::Override,
            tried: vec![encoding],
        },
    })
}

/// Split decoded text into lines on `\n`, `\r\n` or a lone `\r`.
/// A trailing terminator does not produce an empty last line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}
