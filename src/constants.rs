//! Runtime defaults, shared by `RuntimeConfig` and the CLI.

// Render quantum: frames per process call
pub const DEFAULT_QUANTUM_SIZE: usize = 128;
pub const DEFAULT_CHANNELS: usize = 2;
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

// Bytes per sample in module memory (little-endian f32)
pub const SAMPLE_SIZE: usize = 4;

// Channel bounds between control and render contexts
pub const DEFAULT_CONTROL_CAPACITY: usize = 16;
pub const DEFAULT_LOADER_CAPACITY: usize = 16;
pub const DEFAULT_EVENT_CAPACITY: usize = 16;

// Thread priority for the render thread (0-99)
pub const DEFAULT_RENDER_PRIORITY: u8 = 80;

// How long the loader worker waits for requests before checking shutdown
pub const LOADER_POLL_INTERVAL_MS: u64 = 50;

pub const DEFAULT_LOG_LEVEL: &str = "info";
