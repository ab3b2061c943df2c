//! Client-side sync layer between `agrosync-api` and front ends.
//!
//! - **[`Dashboard`]**: facade owning the gateway client, the query cache
//!   and the session port. Reads are cached; mutations invalidate the keys
//!   they affect; an Unauthorized answer ends the session and clears the
//!   cache.
//!
//! - **[`QueryCache`]**: per-key freshness window, request coalescing,
//!   one retry for transient failures, detached fetches. Activity is
//!   reported to an injected [`CacheDiagnostics`].
//!
//! - **[`ResponsiblesEditor`] / [`ThresholdEditor`]**: optimistic
//!   responsibles edits and the alerting switch roll back to the last
//!   acknowledged state on failure; threshold values are edited in a
//!   buffered draft.
//!
//! - **[`ViewSlot`]**: drops answers that belong to a previous selection.
//!
//! - **Domain model** ([`model`]) and presentation helpers ([`format`]).

pub mod config;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod model;
pub mod mutation;
pub mod query;
pub mod session;
pub mod stream;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DashboardConfig, IdentityProviderConfig, QueryPolicy, TlsVerification};
pub use dashboard::{Dashboard, PlotCreation};
pub use error::{CoreError, ErrorPresentation};
pub use mutation::{OptimisticState, ResponsiblesEditor, ThresholdEditor, ThresholdPhase};
pub use query::{CacheDiagnostics, CacheEvent, CacheStats, CountingDiagnostics, QueryCache, QueryKey};
pub use session::{SessionPort, TokenSession};
pub use stream::StateStream;
pub use view::{ViewSlot, ViewState, ViewTicket};

pub use agrosync_api::ErrorKind;

pub use model::{
    Bounds, EmailAddress, Facility, FacilityId, FacilityIrrigations, IrrigationEvent,
    IrrigationKind, IrrigationSummary, LastIrrigation, MonitoredVariable, NewFacility, NewPlot,
    Plot, PlotId, PlotState, ResponsibleSet, SensorVariable, Species, SpeciesId,
    SpeciesThresholds,
};
