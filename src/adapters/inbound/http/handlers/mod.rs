pub mod draft_handlers;
pub mod listing_handlers;

pub use draft_handlers::*;
pub use listing_handlers::*;
