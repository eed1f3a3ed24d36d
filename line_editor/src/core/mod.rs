// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod common;
pub mod log;
pub mod signals;
pub mod terminal_io;
pub mod test_fixtures;
pub mod width_model;

// Re-export.
pub use common::*;
pub use log::*;
pub use signals::*;
pub use terminal_io::*;
pub use test_fixtures::*;
pub use width_model::*;
