pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod process;
pub mod routes;
pub mod session;
pub mod signal;
pub mod store;
pub mod ui;

pub use config::Config;
pub use error::{PanelError, Result};
pub use process::{CommandHandle, RunEvent, RunState};
pub use routes::{RouteParse, RouteRecord};
pub use session::Session;
