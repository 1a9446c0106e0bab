pub mod image;
pub mod listing;
pub mod preview;
pub mod validation;

pub use image::*;
pub use listing::*;
pub use preview::{Preview, PreviewData, PreviewHandle, PreviewRegistry};
pub use validation::{IMAGES_FIELD, MIN_YEAR};
