//! # Reconciliation
//!
//! Decide and apply per-device custom-attribute changes on the MDM.
//!
//! ## Overview
//!
//! Every job follows the same pipeline:
//! - Select spaces and collect devices (and any app-inventory evidence)
//! - Snapshot the asset directory when the policy needs it
//! - Run a [`ReconcilePolicy`] over each device to get at most one [`Action`]
//! - Apply writes with [`AttributeMutator`], merging rather than overwriting
//! - Hand a [`JobReport`] to a [`ReportSink`]
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                              Job                                  │
//! ├───────────────────────────────────────────────────────────────────┤
//! │                                                                   │
//! │  ┌───────────────┐    ┌───────────────┐    ┌───────────────┐      │
//! │  │   Inventory   │───►│  Reconciler   │───►│   Attribute   │      │
//! │  │    Source     │    │   (policy)    │    │    Mutator    │      │
//! │  └───────────────┘    └───────────────┘    └───────────────┘      │
//! │          ▲                    ▲                    │              │
//! │          │                    │                    ▼              │
//! │  ┌───────────────┐    ┌───────────────┐    ┌───────────────┐      │
//! │  │ PagedCollector│    │   Directory   │    │   JobReport   │      │
//! │  │               │    │   Snapshot    │    │  + Statistics │      │
//! │  └───────────────┘    └───────────────┘    └───────────────┘      │
//! │                                                                   │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use mdmsync_reconcile::{jobs, JobContext};
//!
//! let ctx = JobContext::new(&mdm).with_directory(&directory).with_dry_run(true);
//! let report = jobs::ownership::run(&ctx).await?;
//! sink.write(&report)?;
//! ```

pub mod config_sweep;
pub mod error;
pub mod inventory;
pub mod jobs;
pub mod mutator;
pub mod outcome;
pub mod policy;
pub mod reconciler;
pub mod report;
pub mod statistics;
pub mod types;

// Re-export main types
pub use config_sweep::{is_stuck, ClearedConfig, ConfigSweep, FreshnessGate, SweepOutcome};
pub use error::{JobError, JobResult};
pub use inventory::{InventorySource, SpaceFilter};
pub use jobs::{reconcile, AppliedAction, Evidence, JobContext};
pub use mutator::{merge_attributes, AttributeMutator};
pub use outcome::{MutationOutcome, WriteStatus};
pub use policy::{
    AmpToggle, AppPresenceTag, ChannelPromotion, OwnershipClassification, ReconcilePolicy,
};
pub use reconciler::{Plan, PlannedAction, Reconciler};
pub use report::{JobReport, ReportError, ReportOutcome, ReportSink};
pub use statistics::RunStatistics;
pub use types::{Action, ActionKind};
