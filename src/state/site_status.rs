/// Site status definitions for tracking crawl job progress
///
/// A site record moves `pending → scheduled → processing → {done | failed}`,
/// or short-circuits from `scheduled` to `duplicate`.
use std::fmt;

/// Represents the current state of a site record in the crawl queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteStatus {
    // ===== Active States =====
    /// Submitted and waiting to be claimed by the job source
    Pending,

    /// Claimed by the job source and waiting for a worker
    Scheduled,

    /// A worker is crawling the site
    Processing,

    // ===== Terminal States =====
    /// Crawl and publish succeeded
    Done,

    /// Unrecoverable error during crawl or publish
    Failed,

    /// Another record with the same URL is processing or done
    Duplicate,
}

impl SiteStatus {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Duplicate)
    }

    /// Returns true if a record in this state blocks others with the same URL
    pub fn blocks_duplicates(&self) -> bool {
        matches!(self, Self::Processing | Self::Done)
    }

    /// Checks whether the pipeline may move a record from `self` to `next`
    ///
    /// Terminal states only leave through an external reset to `Pending`,
    /// which is not a pipeline transition and is handled by the store.
    pub fn can_transition_to(&self, next: SiteStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Scheduled)
                | (Self::Scheduled, Self::Processing)
                | (Self::Scheduled, Self::Duplicate)
                | (Self::Processing, Self::Processing)
                | (Self::Processing, Self::Done)
                | (Self::Processing, Self::Failed)
        )
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Duplicate => "duplicate",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "scheduled" => Some(Self::Scheduled),
            "processing" => Some(Self::Processing),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            "duplicate" => Some(Self::Duplicate),
            _ => None,
        }
    }

    /// Returns all possible site statuses
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Scheduled,
            Self::Processing,
            Self::Done,
            Self::Failed,
            Self::Duplicate,
        ]
    }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_db_string())
    }
}
