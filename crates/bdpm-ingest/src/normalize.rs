//! Text normalization: accent stripping, trimming, upper-casing.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::canonical_combining_class;

use crate::record::{Record, Value};

/// Strip diacritics, trim and upper-case.
///
/// Compatibility decomposition first, then every combining mark is
/// dropped, so `é` becomes `E` and ligatures such as `ﬁ` expand.
/// Idempotent.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .nfkd()
        .filter(|c| canonical_combining_class(*c) == 0)
        .collect();
    stripped.trim().to_uppercase()
}

/// Normalize a text value; null and numeric values pass through.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::Text(s) => Value::Text(normalize(&s)),
        other => other,
    }
}

/// Normalize every field of a record.
pub fn normalize_record(record: Record) -> Record {
    record.map_values(normalize_value)
}
