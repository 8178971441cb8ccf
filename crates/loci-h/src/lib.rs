//! Headless Chromium backend driven over the Chrome DevTools Protocol.

pub mod backend;
pub mod cdp;
pub mod inject;

pub use backend::HeadlessBackend;
