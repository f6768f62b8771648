//! XML escaping for raw attribute values and element text.
//!
//! Only the five predefined XML entities are produced. Every other byte,
//! including `\` and multi-byte UTF-8 sequences, is copied through untouched.

/// Returns the entity replacing `b`, or `None` when `b` passes through.
#[inline]
pub fn entity_for(b: u8) -> Option<&'static str> {
    match b {
        b'"' => Some("&quot;"),
        b'\'' => Some("&apos;"),
        b'<' => Some("&lt;"),
        b'>' => Some("&gt;"),
        b'&' => Some("&amp;"),
        _ => None,
    }
}

/// Appends `raw` to `out`, escaping the five XML special characters.
pub fn push_escaped(out: &mut Vec<u8>, raw: &[u8]) {
    out.reserve(raw.len());
    let mut copied = 0;
    for (i, &b) in raw.iter().enumerate() {
        if let Some(entity) = entity_for(b) {
            out.extend_from_slice(&raw[copied..i]);
            out.extend_from_slice(entity.as_bytes());
            copied = i + 1;
        }
    }
    out.extend_from_slice(&raw[copied..]);
}

/// String version of [`push_escaped`].
pub fn escape_str(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match u8::try_from(ch).ok().and_then(entity_for) {
            Some(entity) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    out
}
