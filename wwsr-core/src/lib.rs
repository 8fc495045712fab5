//! wwsr-core: Pure decode library for the wireless weather station reader.
//!
//! No USB, no async. Transport is abstracted behind [`station::StationIo`];
//! this crate is shared by the `wwsr` binary and its tests.

pub mod compass;
pub mod config;
pub mod dump;
pub mod meteo;
pub mod reading;
pub mod record;
pub mod station;
pub mod template;
pub mod types;

// Re-export commonly used types at crate root
pub use reading::Reading;
pub use record::{SensorRecord, RECORD_SIZE};
pub use station::{read_current_record, read_memory, MemoryImage, StationIo};
pub use template::{Tag, Template};
pub use types::*;
