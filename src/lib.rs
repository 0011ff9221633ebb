pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod poller;
pub mod state_file;
pub mod storage;
pub mod types;

pub use api::{ApwgClient, FeedQuery, FeedTransport, RawResponse};
pub use config::ClientConfig;
pub use error::{FeedError, Result};
pub use poller::{PollWindow, Poller};
pub use state_file::FileStateStore;
pub use storage::{MemoryStateStore, StateStore};
pub use types::{FeedBatch, Indicator, RawRecord};
