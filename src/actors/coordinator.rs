use std::sync::Arc;

use actix::prelude::*;

use crate::metrics::Metrics;
use crate::notify::LowStockNotifier;
use crate::store::AnalyticsStore;
use crate::utils::CircuitState;

use super::analytics::AnalyticsActor;
use super::health::{ComponentHealth, HealthStatus};

// ============================================================================
// Coordinator Actor - Supervises infrastructure actors
// ============================================================================
//
// Responsibilities:
// - Starts the analytics actor and hands out its address
// - Periodically reports component health (notification sink circuit)
// - Coordinates graceful shutdown
//
// Actor hierarchy:
//   CoordinatorActor (supervisor)
//   └── AnalyticsActor
//
// ============================================================================

const HEALTH_CHECK_INTERVAL: std::time::Duration = std::time::Duration::from_secs(30);

pub struct CoordinatorActor {
    analytics_store: Arc<dyn AnalyticsStore>,
    notifier: Arc<LowStockNotifier>,
    metrics: Arc<Metrics>,
    analytics: Option<Addr<AnalyticsActor>>,
}

impl CoordinatorActor {
    pub fn new(
        analytics_store: Arc<dyn AnalyticsStore>,
        notifier: Arc<LowStockNotifier>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            analytics_store,
            notifier,
            metrics,
            analytics: None,
        }
    }
}

impl Actor for CoordinatorActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("CoordinatorActor started");

        let analytics =
            AnalyticsActor::new(self.analytics_store.clone(), self.metrics.clone()).start();
        self.analytics = Some(analytics);

        ctx.run_interval(HEALTH_CHECK_INTERVAL, |act, _ctx| {
            let notifier = act.notifier.clone();
            let metrics = act.metrics.clone();
            actix::spawn(async move {
                let state = notifier.sink_circuit_state().await;
                metrics.notifier_circuit_state.set(state as i64);

                let health = match state {
                    CircuitState::Closed => {
                        ComponentHealth::new("notification_sink", HealthStatus::Healthy)
                    }
                    CircuitState::HalfOpen => ComponentHealth::new(
                        "notification_sink",
                        HealthStatus::Degraded("circuit half-open".to_string()),
                    ),
                    CircuitState::Open => ComponentHealth::new(
                        "notification_sink",
                        HealthStatus::Unhealthy("circuit open".to_string()),
                    ),
                };

                match &health.status {
                    HealthStatus::Healthy => {
                        tracing::debug!(
                            component = %health.name,
                            checked_at = %health.last_check,
                            "health check ok"
                        );
                    }
                    HealthStatus::Degraded(msg) => {
                        tracing::warn!(component = %health.name, %msg, "health check degraded");
                    }
                    HealthStatus::Unhealthy(msg) => {
                        tracing::error!(component = %health.name, %msg, "health check failing");
                    }
                }
            });
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        tracing::info!("CoordinatorActor stopping");
        Running::Stop
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "Option<Addr<AnalyticsActor>>")]
pub struct GetAnalyticsActor;

impl Handler<GetAnalyticsActor> for CoordinatorActor {
    type Result = Option<Addr<AnalyticsActor>>;

    fn handle(&mut self, _msg: GetAnalyticsActor, _: &mut Self::Context) -> Self::Result {
        self.analytics.clone()
    }
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Shutdown;

impl Handler<Shutdown> for CoordinatorActor {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Self::Context) {
        tracing::info!("received shutdown signal");
        ctx.stop();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
