/// Crawl phase definitions for tracking run progress
///
/// A run moves through these phases once for discovery and then loops over
/// the per-service phases, one service at a time.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Coordinator created, nothing fetched yet
    Init,

    /// Fetching and extracting the services index
    DiscoveringServices,

    // ===== Per-service loop =====
    /// Fetching and extracting one service page
    DiscoveringMethods,

    /// Method pool running for the current service
    RunningMethodPool,

    /// Writing the result tree after a service completed
    Checkpointing,

    /// Final write done, run finished
    Done,
}

impl CrawlPhase {
    /// Returns true if this phase belongs to the per-service loop
    pub fn is_per_service(&self) -> bool {
        matches!(
            self,
            Self::DiscoveringMethods | Self::RunningMethodPool | Self::Checkpointing
        )
    }

    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if the coordinator may move from this phase to `next`
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;
        matches!(
            (self, next),
            (Init, DiscoveringServices)
                | (DiscoveringServices, DiscoveringMethods)
                | (DiscoveringServices, Done)
                | (DiscoveringMethods, RunningMethodPool)
                | (RunningMethodPool, Checkpointing)
                | (Checkpointing, DiscoveringMethods)
                | (Checkpointing, Done)
        )
    }

    /// Short lowercase label used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::DiscoveringServices => "discovering_services",
            Self::DiscoveringMethods => "discovering_methods",
            Self::RunningMethodPool => "running_method_pool",
            Self::Checkpointing => "checkpointing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
