//! Unordered-pair keys and their persisted string encoding.
//!
//! Cache rows key each pair with a tuple-literal string, `('A', 'B')`,
//! so the flat file stays human-readable and the key parses back into
//! its two components even when a location name contains commas or
//! apostrophes (escaped as `\'`).

/// Returns the canonical (sorted) form of an unordered pair.
#[must_use]
pub fn canonical(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Encodes a pair as a tuple literal.
#[must_use]
pub fn encode(a: &str, b: &str) -> String {
    format!("('{}', '{}')", escape(a), escape(b))
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Decodes a tuple literal produced by [`encode`].
///
/// Returns `None` if the string is not a well-formed two-element tuple
/// of quoted names.
#[must_use]
pub fn decode(key: &str) -> Option<(String, String)> {
    let inner = key.strip_prefix('(')?.strip_suffix(')')?;
    let rest = inner.strip_prefix('\'')?;
    let (first, rest) = take_quoted(rest)?;
    let rest = rest.strip_prefix(',')?.trim_start();
    let rest = rest.strip_prefix('\'')?;
    let (second, rest) = take_quoted(rest)?;
    if !rest.is_empty() {
        return None;
    }
    Some((first, second))
}

/// Consumes characters up to the closing quote, unescaping as it goes.
/// Returns the unescaped content and the remainder after the quote.
fn take_quoted(s: &str) -> Option<(String, &str)> {
    let mut out = String::new();
    let mut chars = s.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                let (_, escaped) = chars.next()?;
                out.push(escaped);
            }
            '\'' => return Some((out, &s[i + 1..])),
            _ => out.push(c),
        }
    }
    None
}
