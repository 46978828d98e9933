pub mod config;
pub mod inputs;
pub mod output;
pub mod preset;
pub mod scenario;
pub mod scoring;
pub mod server;
pub mod variables;
pub mod weights;
