//! Cache key generation and normalization.

use std::fmt;

const SEPARATOR: char = ':';
const ESCAPE: char = '\\';
const NONE_MARKER: char = '~';
const SOME_MARKER: char = '=';

/// Deterministic cache key built from a request's normalized parameters.
///
/// Coordinates are rounded to 6 decimals (about 10 cm). Free-text fields
/// have the separator and the optional-field markers escaped, so two
/// different parameter lists never map to the same key and equal lists
/// always do.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    parts: Vec<String>,
}

impl CacheKey {
    /// Starts a key in `namespace`, e.g. `"parsed_routes"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use campus_cache::cache::CacheKey;
    ///
    /// let key = CacheKey::new("nearby_bikes")
    ///     .coord(52.5125)
    ///     .coord(13.3269)
    ///     .field(500)
    ///     .build();
    /// assert_eq!(key, "nearby_bikes:52.512500:13.326900:500");
    /// ```
    pub fn new(namespace: &str) -> Self {
        Self {
            parts: vec![escape(namespace)],
        }
    }

    /// Appends a coordinate rounded to 6 decimals.
    pub fn coord(mut self, value: f64) -> Self {
        let mut formatted = format!("{:.6}", value);
        if formatted == "-0.000000" {
            formatted = "0.000000".to_string();
        }
        self.parts.push(formatted);
        self
    }

    pub fn field(mut self, value: impl fmt::Display) -> Self {
        self.parts.push(escape(&value.to_string()));
        self
    }

    pub fn flag(mut self, value: bool) -> Self {
        self.parts.push(if value { "1" } else { "0" }.to_string());
        self
    }

    /// Appends an optional field. `None` and `Some("")` stay distinct.
    pub fn opt_field(mut self, value: Option<impl fmt::Display>) -> Self {
        match value {
            Some(v) => self.parts.push(format!("{}{}", SOME_MARKER, escape(&v.to_string()))),
            None => self.parts.push(NONE_MARKER.to_string()),
        }
        self
    }

    pub fn build(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", SEPARATOR)?;
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}

/// Escapes every character with a meaning inside a key part, so a free-text
/// field can never spell an optional-field marker.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, SEPARATOR | ESCAPE | NONE_MARKER | SOME_MARKER) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}
