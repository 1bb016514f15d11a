// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    Strategy,
    expand_path,
    freshness_counts,
    parse_merge_choice,
    parse_strategy,
};
