pub mod bridge;
pub mod command;
pub mod compose;
pub mod config;
pub mod events;
pub mod invoke;
pub mod logging;
pub mod options;
pub mod worker;

pub use bridge::Bridge;
pub use events::{event_channel, EventSender};
pub use logging::{init_debug_log_file, log_debug, log_file_path};
