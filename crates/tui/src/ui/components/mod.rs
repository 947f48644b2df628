pub mod component;
mod form_view;
mod handlers;
mod header;
mod hint_bar;
pub mod logs;
mod state_panel;

pub(crate) use component::Component;
pub use handlers::HandlersComponent;
pub use header::HeaderComponent;
pub use hint_bar::HintBarComponent;
pub use logs::LogsComponent;
pub use state_panel::StatePanelComponent;
