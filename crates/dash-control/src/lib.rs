pub mod controller;
pub mod docker;
pub mod restart;
pub mod runtime;

pub use controller::ContainerController;
pub use docker::DockerCli;
pub use restart::{RestartQueue, RestartWorkerHandle};
pub use runtime::{ContainerInfo, ContainerRuntime, RuntimeControlError};
