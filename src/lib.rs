// Library root
// -----------
// This crate exposes the upload pipeline as a library. The binary
// (`main.rs`) wires it to the terminal and the real HTTP client.
//
// Module responsibilities:
// - `api`: HTTP interactions with OpenScanCloud behind the `CloudService`
//   trait.
// - `quota`: token file and usage limits.
// - `selection`: picking eligible images and checking them against limits.
// - `archive`: zipping a selection and splitting it into parts.
// - `project`: registering an archive and pairing parts with upload links.
// - `upload`: ordered part transfer and the start trigger.
// - `session`: the interactive loop tying the steps together.
// - `ui`: colored output and prompts behind the `Operator` trait.
pub mod api;
pub mod archive;
pub mod config;
pub mod constants;
pub mod error;
pub mod project;
pub mod quota;
pub mod selection;
pub mod session;
pub mod ui;
pub mod upload;

pub use error::{Result, UploaderError};
