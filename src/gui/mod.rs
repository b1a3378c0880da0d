//! GUI module - User interface components

mod app;
mod control_panel;
mod dashboard_view;

pub use app::SocialPulseApp;
pub use control_panel::{ControlPanel, ControlPanelAction, FilterSettings};
pub use dashboard_view::{DashboardView, Page};
