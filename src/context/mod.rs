pub mod synthesizer;
pub mod tree;

pub use synthesizer::{ContextSynthesizer, ContextView};
pub use tree::render_tree;
