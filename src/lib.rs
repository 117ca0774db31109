pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod state;
pub mod storage;
pub mod types;

pub use config::Config;
pub use error::{IngestError, Result};
pub use server::{create_server, start_server};
pub use state::AppState;
pub use storage::{InMemoryLog, RecordStore};
pub use types::{IngestionRecord, Payload, PayloadPolicy};
