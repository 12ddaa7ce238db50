use std::sync::LazyLock;

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use engine_logging::engine_warn;
use regex::bytes::Regex;

/// How far into the file a `<meta charset>` declaration is looked for.
const META_PRESCAN_BYTES: usize = 1024;

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([A-Za-z0-9_:.\-]+)"#)
        .expect("static regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown charset label {0:?}")]
    UnknownCharset(String),
}

/// Decode an exported page into UTF-8 using: BOM -> configured charset ->
/// `<meta charset>` -> chardetng fallback.
///
/// Malformed sequences are replaced with U+FFFD rather than rejecting the page.
pub fn decode_html(bytes: &[u8], charset: Option<&str>) -> Result<DecodedHtml, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return Ok(decode_with(bytes, encoding));
    }

    if let Some(label) = charset {
        let enc = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| DecodeError::UnknownCharset(label.to_string()))?;
        return Ok(decode_with(bytes, enc));
    }

    if let Some(enc) = sniff_meta_charset(bytes) {
        return Ok(decode_with(bytes, enc));
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    Ok(decode_with(bytes, enc))
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_PRESCAN_BYTES)];
    let captures = META_CHARSET.captures(head)?;
    Encoding::for_label(captures.get(1)?.as_bytes())
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedHtml {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        engine_warn!(
            "Page is not valid {}; decoded with replacement characters",
            enc.name()
        );
    }
    DecodedHtml {
        html: text.into_owned(),
        encoding_label: enc.name().to_string(),
    }
}
