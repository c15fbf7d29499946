//! Storefront rendering: grid/list layouts, pagination controls and the client view state.

pub mod html;
pub mod view_state;

pub use html::{render_pagination, render_results};
pub use view_state::{
    FetchOutcome, FetchRequest, RenderedView, ViewAction, ViewEffect, ViewMode, ViewState,
};
