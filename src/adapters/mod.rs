pub mod crossterm_adapter;
pub mod fs_file_store;
pub mod json_history_store;
pub mod syntect_highlighter;

pub use crossterm_adapter::CrosstermTerminal;
pub use fs_file_store::FsFileStore;
pub use json_history_store::JsonHistoryStore;
pub use syntect_highlighter::SyntectHighlighter;
