mod server;

use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};

pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Covers the hot paths of the core:
// - inventory mutations (throughput, latency, failures, lock contention)
// - order lifecycle (creations, transitions)
// - vendor analytics propagation outcomes
// - notification sink circuit state
//
// All metrics hang off one Registry, scraped via /metrics.
//
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Inventory Metrics
    pub inventory_mutations: IntCounterVec,
    pub inventory_mutation_failures: IntCounterVec,
    pub inventory_mutation_duration: HistogramVec,
    pub lock_contention: IntCounter,

    // Order Metrics
    pub orders_created: IntCounter,
    pub order_transitions: IntCounterVec,

    // Side-Effect Metrics
    pub low_stock_alerts: IntCounter,
    pub analytics_increments: IntCounterVec,
    pub notifier_circuit_state: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let inventory_mutations = IntCounterVec::new(
            Opts::new("inventory_mutations_total", "Committed stock mutations"),
            &["operation"],
        )?;
        registry.register(Box::new(inventory_mutations.clone()))?;

        let inventory_mutation_failures = IntCounterVec::new(
            Opts::new(
                "inventory_mutation_failures_total",
                "Stock mutations that failed validation or persistence",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(inventory_mutation_failures.clone()))?;

        let inventory_mutation_duration = HistogramVec::new(
            HistogramOpts::new(
                "inventory_mutation_duration_seconds",
                "End-to-end stock mutation duration including lease handling",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(inventory_mutation_duration.clone()))?;

        let lock_contention = IntCounter::new(
            "lock_contention_total",
            "Stock mutations denied because the product lease was held elsewhere",
        )?;
        registry.register(Box::new(lock_contention.clone()))?;

        let orders_created = IntCounter::new("orders_created_total", "Orders persisted")?;
        registry.register(Box::new(orders_created.clone()))?;

        let order_transitions = IntCounterVec::new(
            Opts::new("order_transitions_total", "Committed order status transitions"),
            &["target"],
        )?;
        registry.register(Box::new(order_transitions.clone()))?;

        let low_stock_alerts = IntCounter::new(
            "low_stock_alerts_total",
            "Low-stock alerts enqueued for vendors",
        )?;
        registry.register(Box::new(low_stock_alerts.clone()))?;

        let analytics_increments = IntCounterVec::new(
            Opts::new(
                "analytics_increments_total",
                "Vendor analytics delta applications by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(analytics_increments.clone()))?;

        let notifier_circuit_state = IntGauge::new(
            "notifier_circuit_state",
            "Notification sink circuit state (0=Closed, 1=Open, 2=HalfOpen)",
        )?;
        registry.register(Box::new(notifier_circuit_state.clone()))?;

        Ok(Self {
            registry,
            inventory_mutations,
            inventory_mutation_failures,
            inventory_mutation_duration,
            lock_contention,
            orders_created,
            order_transitions,
            low_stock_alerts,
            analytics_increments,
            notifier_circuit_state,
        })
    }

    /// The registry backing the /metrics endpoint.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("failed to create metrics")
    }
}
