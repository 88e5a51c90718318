use serde::Serialize;
use std::fmt;

/// Why an event was acknowledged without doing any work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ThumbnailEcho,
    UnrecognizedKey,
    ForeignBucket,
    MissingPathSegment,
    ObjectNotFound,
    NoMatchingRecord,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::ThumbnailEcho => "thumbnail_echo",
            SkipReason::UnrecognizedKey => "unrecognized_key",
            SkipReason::ForeignBucket => "foreign_bucket",
            SkipReason::MissingPathSegment => "missing_path_segment",
            SkipReason::ObjectNotFound => "object_not_found",
            SkipReason::NoMatchingRecord => "no_matching_record",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Processed,
    Skipped(SkipReason),
}

/// Per-batch tally returned to the notification source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &ProcessOutcome) {
        match outcome {
            ProcessOutcome::Processed => self.processed += 1,
            ProcessOutcome::Skipped(_) => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}
