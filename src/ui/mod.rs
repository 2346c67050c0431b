pub mod diff_view;
pub mod help;
pub mod history;
pub mod layout;
pub mod styles;
pub mod theme;
