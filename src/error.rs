use std::time::Duration;

/// Named failure conditions raised by the extraction code.
/// Callers decide if a condition is fatal or isolated to the unit at hand.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },
    #[error("row {row} has {cells} cells, expected at least {expected}")]
    MalformedRow {
        row: usize,
        cells: usize,
        expected: usize,
    },
    #[error("unparsable date {input:?}")]
    BadDate {
        input: String,
        #[source]
        source: Option<chrono::ParseError>,
    },
    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
}

impl ScrapeError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Whether this is a lookup miss or timeout, as opposed to malformed data
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_classification() {
        assert!(ScrapeError::not_found("table").is_miss());
        assert!(
            ScrapeError::Timeout {
                what: "table".into(),
                after: Duration::from_secs(1)
            }
            .is_miss()
        );
        assert!(
            !ScrapeError::MalformedRow {
                row: 1,
                cells: 2,
                expected: 3
            }
            .is_miss()
        );
    }

    #[test]
    fn display() {
        let e = ScrapeError::MalformedRow {
            row: 4,
            cells: 1,
            expected: 3,
        };
        assert_eq!("row 4 has 1 cells, expected at least 3", e.to_string());
    }
}
