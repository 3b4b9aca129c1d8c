pub mod describer;
pub mod directory;
pub mod planner;
pub mod record;

pub use describer::FileDescriber;
pub use directory::DirectoryAnalyzer;
pub use planner::{affected_directories, resolve_target, RefreshPlanner, RefreshScope};
pub use record::{
    Change, DependencyEdge, DependencyKind, DirectoryAnalysisRecord, FileAnalysis,
    EXPORT_SENTINEL, MAX_KEY_FILES, MAX_RECENT_CHANGES,
};
