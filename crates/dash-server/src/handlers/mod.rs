pub mod debug;
pub mod docker;
pub mod metrics;

pub use debug::*;
pub use docker::*;
pub use metrics::*;
