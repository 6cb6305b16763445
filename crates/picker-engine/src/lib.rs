//! Picker Engine
//!
//! The coordinator side of the browser picker:
//! - folds collaborator events and display intents into canonical state
//! - resolves physical key codes under the live keyboard layout
//! - reorders the app list from drag gestures
//! - decides launch, persist and clipboard side effects
//! - fans the resulting snapshot out to every connected display
//!
//! Public API:
//! - [`CoordinatorState`]: the pure reducer ([`CoordinatorState::apply`])
//! - [`Coordinator`] and [`CoordinatorHandle`]: the single-owner shell
//! - [`Collaborators`]: the side-effect seam
//! - [`layout`], [`ordering`], [`url_trim`]: pure helpers used by the reducer
//!   and by displays for local previews

mod collaborators;
mod coordinator;
mod error;
pub mod layout;
pub mod ordering;
mod reducer;
mod registry;
pub mod url_trim;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use collaborators::Collaborators;
pub use coordinator::{Control, Coordinator, CoordinatorHandle, DisplayLink};
pub use error::{Error, Result};
pub use reducer::{CoordinatorState, Effect, LaunchRequest, Transition};
pub use registry::DisplayRegistry;
