//! CDC-to-view synchronization core.
//!
//! ```text
//! ChangeStreamConnector ──► EventMirror ──► SnapshotRefresher ──► ViewState ──► readers
//!                               │                  ▲
//!                               └── MirrorHistory  └── JobOrderRepositoryTrait
//! ```

mod backoff;
mod change_event;
mod event_mirror;
mod history;
mod refresher;
mod stream;
mod view_state;


pub use backoff::ReconnectPolicy;
pub use change_event::{ChangeEvent, ChangeOperation, ChangePayload};
pub use event_mirror::{EventMirror, MirrorConfig, MirrorExit};
pub use history::MirrorHistory;
pub use refresher::SnapshotRefresher;
pub use stream::{ChangeStream, ChangeStreamConnector, StreamError};
pub use view_state::{ViewSnapshot, ViewState};
