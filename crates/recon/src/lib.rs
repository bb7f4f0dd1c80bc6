//! `shelfsync-recon`: retail-media ad/sales reconciliation engine.
//!
//! Pure engine crate: pulls raw records through a [`DataSource`], returns the
//! unified record sets, organic residuals and summary metrics. No CLI
//! dependencies; the only IO is the optional CSV source.

pub mod aggregate;
pub mod channel;
pub mod config;
pub mod derived;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod source;
pub mod summary;
pub mod validate;

pub use channel::{ChannelFlags, ChannelRole, ChannelTable};
pub use config::{AdAllocation, SyncConfig};
pub use engine::{run_sync, run_window};
pub use error::ReconError;
pub use model::{DateWindow, SyncResult, SyncStage, SyncSummary};
pub use reconcile::reconcile;
pub use source::{CsvSource, DataSource, MemorySource};
pub use summary::summarize;
