pub mod file_store;
pub mod highlighter;
pub mod history;
pub mod terminal;

pub use file_store::{FileStore, LoadError};
pub use highlighter::{Highlighter, LexerHandle};
pub use history::{remember, HistoryStore, RecentPair};
pub use terminal::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseKind, Terminal, TerminalEvent};
