// ============================================================================
// Actors Module
// ============================================================================
//
// Actor-based infrastructure for asynchronous side effects.
//
// Note: Domain logic (orders, inventory, settlement) uses CommandHandlers,
//       NOT actors. Actors are reserved for infrastructure concerns:
//       analytics propagation, supervision, health reporting.
//
// ============================================================================

mod analytics;
mod coordinator;
mod health;

pub use analytics::{AnalyticsActor, ApplyOrderDeltas};
pub use coordinator::{CoordinatorActor, GetAnalyticsActor, Shutdown};
pub use health::{ComponentHealth, HealthStatus};
