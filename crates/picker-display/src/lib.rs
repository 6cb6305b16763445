//! Picker Display
//!
//! Renderer-side adapters. A display mirrors canonical state from the
//! coordinator's broadcasts and sends user intents back on its own lane. It
//! never computes canonical truth; the only state it owns outright is
//! ephemeral UI state such as a drag preview.
//!
//! - [`Display`]: lane checks, snapshot folding and intent sending, generic
//!   over a [`Projection`]
//! - [`PickerView`]: the browser tiles window
//! - [`UrlBarView`]: the URL strip with backspace and copy buttons
//!
//! Rendering is left to the embedding process.

mod adapter;
mod error;
mod picker;
mod url_bar;

pub use adapter::{Display, Projection};
pub use error::{Error, Result};
pub use picker::{DragPreview, PickerStatus, PickerView};
pub use url_bar::{UrlBarView, UrlParts};
