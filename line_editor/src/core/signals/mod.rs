// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod os_signal_forwarder;
pub mod terminal_signal_hub;

// Re-export.
pub use os_signal_forwarder::*;
pub use terminal_signal_hub::*;
