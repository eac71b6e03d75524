pub mod api;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod recorder;
pub mod server;
pub mod shutdown;
pub mod state;

pub use api::create_router;
pub use error::ApiError;
pub use recorder::{Recorder, RecorderHandle, TickReport};
pub use state::AppState;
