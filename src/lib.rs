pub mod canvas;
pub mod courses;
pub mod fetch;
pub mod grading;
pub mod output;
pub mod server;
pub mod settings;
pub mod telemetry;
