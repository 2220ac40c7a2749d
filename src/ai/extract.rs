//! Structured-output recovery.
//!
//! Models are asked for bare JSON but routinely wrap it in prose or
//! markdown fencing. This scans for the first balanced bracket span of the
//! requested shape and parses just that. Failure is `None`, never an
//! error; callers decide how to degrade.

use serde_json::Value;

/// Which top-level JSON shape to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Array,
    Object,
}

impl JsonShape {
    fn delimiters(self) -> (char, char) {
        match self {
            Self::Array => ('[', ']'),
            Self::Object => ('{', '}'),
        }
    }
}

/// Extract the first balanced JSON value of the given shape from raw model
/// output.
///
/// Delimiters before the first opener are ignored; nesting depth is
/// tracked over the requested delimiter pair only, matching the recovery
/// behavior the generation pipeline has always relied on.
pub fn extract_json(raw: &str, shape: JsonShape) -> Option<Value> {
    let (open, close) = shape.delimiters();
    let start = raw.find(open)?;
    let mut depth = 0usize;
    for (offset, ch) in raw[start..].char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                let span = &raw[start..=start + offset];
                return serde_json::from_str(span).ok();
            }
        }
    }
    None
}
