pub mod ignore_filter;
pub mod walker;
pub mod watcher;

pub use ignore_filter::IgnoreFilter;
pub use walker::ProjectWalker;
pub use watcher::ChangeWatcher;
