// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod escape_decoder_impl;
pub mod escape_key_event;

// Re-export.
pub use escape_decoder_impl::*;
pub use escape_key_event::*;
