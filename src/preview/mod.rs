//! Preview surface
//!
//! View state (mode and viewport), the pages that show the generated
//! document, and the local HTTP server that serves them.

pub mod page;
pub mod server;
pub mod view;

pub use page::{escape_html, render_page, IFRAME_SANDBOX, PLACEHOLDER_TEXT};
pub use server::{preview_router, PreviewContext, PreviewServer};
pub use view::{PreviewState, ViewMode, Viewport};
