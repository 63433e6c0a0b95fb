//! Terminal interface: the tabbed form, its dialogs and input handling
//!
//! `App` owns the session and all view state. Key and mouse events mutate it through
//! the handlers in `key_handler` and `mouse_handler`; `render` draws it each frame.

pub mod app;
pub mod dialog;
pub mod form_widget;
pub mod key_handler;
pub mod log_state;
pub mod mouse_handler;
pub mod render;
pub mod text_input;
pub mod toolbar;
