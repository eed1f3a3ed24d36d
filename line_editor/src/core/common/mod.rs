// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod common_macros;
pub mod control_flow;
pub mod miette_setup_global_report_handler;
pub mod type_aliases;

// Re-export.
pub use control_flow::*;
pub use miette_setup_global_report_handler::*;
pub use type_aliases::*;
