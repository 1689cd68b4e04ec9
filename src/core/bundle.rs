use serde::{Deserialize, Serialize};

/// A genomic interval reported by a transcript-assembly run
///
/// Bundles compare structurally: two bundles are the same bundle only if
/// chromosome, start and end all agree. Ordering is by chromosome, then
/// start, then end, which gives bundle lists a reproducible order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bundle {
    /// Reference sequence name as it appears in the log (and the BAM header)
    pub chromosome: String,

    /// Interval start as printed by the assembler
    pub start: u64,

    /// Interval end as printed by the assembler
    pub end: u64,
}

impl Bundle {
    pub fn new(chromosome: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            chromosome: chromosome.into(),
            start,
            end,
        }
    }

    /// Number of bases spanned, treating the coordinates as half-open
    #[must_use]
    pub fn span(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// True when the interval cannot contain any position
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl std::fmt::Display for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.chromosome, self.start, self.end)
    }
}
