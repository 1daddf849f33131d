pub mod error;
pub mod history;
pub mod interaction;
pub mod session;
pub mod timeline;
pub mod zoom;
