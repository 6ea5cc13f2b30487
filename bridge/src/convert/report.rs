//! Conversion diagnostics
//!
//! Non-fatal events observed while converting foreign values to host
//! values. Unknown leaves and widened integers never abort a conversion,
//! but callers and tests can still see exactly where they happened.

use serde::Serialize;

/// What was observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Classifier found no kind for this runtime class; the sentinel was emitted
    UnrecognizedType { class: String },

    /// Integer too wide for a host number; emitted as its decimal string
    PrecisionWidened { digits: usize },

    /// Double with no host number form (NaN, ±infinity); the sentinel was emitted
    NonFiniteNumber { value: String },

    /// Two map keys coerced to the same object key; the later entry was kept
    KeyCollision { key: String },

    /// Collection nested beyond `max_depth`; the sentinel was emitted
    DepthLimitExceeded { limit: usize },
}

/// One observation, located by a path such as `$[2].:user/roles{0}`
///
/// `[i]` indexes a sequence, `.key` selects an object member and `{i}`
/// denotes the key of the i-th map entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

/// All observations from one conversion, in traversal order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    diagnostics: Vec<Diagnostic>,
}

impl ConversionReport {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// True when nothing was degraded, widened or overwritten
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics for values that were replaced by the sentinel
    pub fn unrecognized(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| {
            matches!(
                d.kind,
                DiagnosticKind::UnrecognizedType { .. }
                    | DiagnosticKind::NonFiniteNumber { .. }
                    | DiagnosticKind::DepthLimitExceeded { .. }
            )
        })
    }

    /// Number of integers emitted as strings
    pub fn widened_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.kind, DiagnosticKind::PrecisionWidened { .. }))
            .count()
    }

    pub(crate) fn push(&mut self, path: String, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic { path, kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_flat() {
        let mut report = ConversionReport::default();
        report.push("$[1]".to_string(), DiagnosticKind::PrecisionWidened { digits: 20 });
        let json = serde_json::to_value(report.diagnostics()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"path": "$[1]", "type": "precision_widened", "digits": 20}])
        );
    }

    #[test]
    fn test_filters() {
        let mut report = ConversionReport::default();
        report.push("$".to_string(), DiagnosticKind::UnrecognizedType { class: "java.util.UUID".into() });
        report.push("$".to_string(), DiagnosticKind::KeyCollision { key: ":a".into() });
        assert_eq!(report.unrecognized().count(), 1);
        assert_eq!(report.widened_count(), 0);
        assert!(!report.is_clean());
    }
}
