// Download status shared type definitions
// Each submodule defines plain data exchanged between the engine, the host and presentation surfaces.

pub mod download;
pub mod errors;
pub mod file_type;
pub mod message;
pub mod options;
