//! Front ends
//!
//! Both adapters translate user actions into controller calls and render
//! from the `GameEvent` stream; neither touches session state directly.

pub mod headless;
pub mod input;
pub mod terminal;
pub mod view;

pub use input::UiCommand;
pub use view::ViewModel;
