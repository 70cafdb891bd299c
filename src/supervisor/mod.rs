pub mod launcher;
pub mod runner;

pub use launcher::{Launcher, WorkerExit};
pub use runner::{SuperviseError, Supervisor, Target};
