//! Normalization of the polymorphic `detection_results` field.
//!
//! Historical service versions stored detections as a JSON array, a
//! JSON-encoded string, a `{"results": [...]}` wrapper, or a bare object.
//! [`normalize`] folds every shape into a flat `Vec<DetectionRecord>` and is
//! total: malformed or unrecognized input becomes an empty list, never an
//! error. Rendering and counting downstream only ever see the flat list.

use crate::model::{DetectionRecord, RawDetections};

/// Flatten a raw `detection_results` value into a record list.
///
/// - a sequence is returned as parsed, with no element-level validation;
/// - a string is JSON-decoded, and kept only if it decodes to a sequence;
/// - a `{"results": [...]}` wrapper yields the inner sequence;
/// - any other object becomes a single-element list;
/// - anything else (numbers, booleans, mixed arrays) yields an empty list.
pub fn normalize(raw: Option<&RawDetections>) -> Vec<DetectionRecord> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    match raw {
        RawDetections::Many(records) => records.clone(),
        RawDetections::Wrapped { results } => results.clone(),
        RawDetections::Encoded(text) => {
            match serde_json::from_str::<Vec<DetectionRecord>>(text) {
                Ok(records) => records,
                Err(_) => Vec::new(),
            }
        }
        RawDetections::One(record) => vec![record.clone()],
        RawDetections::Other(_) => Vec::new(),
    }
}

/// Count of objects in a row's detections, via the same total mapping.
pub fn detection_count(raw: Option<&RawDetections>) -> usize {
    normalize(raw).len()
}
