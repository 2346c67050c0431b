pub mod char_diff;
pub mod fold;
pub mod layout;
pub mod line_diff;
pub mod navigation;
pub mod scroll_sync;
pub mod types;

pub use fold::FoldOptions;
pub use layout::{compute_layout, single_side, DiffLayout, LayoutOptions};
pub use line_diff::DiffOptions;
pub use navigation::{locate_line, next_diff_block, prev_diff_block};
pub use scroll_sync::{ScrollSync, Surface};
pub use types::*;
