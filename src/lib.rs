pub mod analysis;
pub mod collaborators;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod indexer;
pub mod parser;

pub use analysis::{
    Change, DependencyEdge, DependencyKind, DirectoryAnalysisRecord, DirectoryAnalyzer,
    FileAnalysis, FileDescriber, RefreshPlanner, RefreshScope,
};
pub use collaborators::{
    AgentCollaborator, AiCollaborator, Collaborators, DirectoryInsight, GitCli, NoVersionControl,
    VersionControl,
};
pub use config::{AgentSettings, AnalysisMode, Configuration, Integrations, OutputFormat};
pub use context::{render_tree, ContextSynthesizer, ContextView};
pub use document::DOCUMENT_FILENAME;
pub use error::{ContextError, Result};
pub use indexer::{ChangeWatcher, IgnoreFilter, ProjectWalker};
pub use parser::{ParsedFile, SourceAnalyzer};
