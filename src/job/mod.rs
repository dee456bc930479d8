//! Remote generation job lifecycle: status model, polling and URL resolution.

mod poller;
mod resolver;
mod task;

pub use poller::{PollConfig, StatusPoller};
pub use resolver::resolve_download_url;
pub use task::{FileReference, GenerationTask, TaskStatus};
