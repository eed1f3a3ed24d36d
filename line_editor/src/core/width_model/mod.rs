// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod unicode_width_model;
pub mod width_model_api;

// Re-export.
pub use unicode_width_model::*;
pub use width_model_api::*;
