// ============================================================================
// Notifications
// ============================================================================
//
// Fire-and-forget alerting: the sink seam, the best-effort realtime
// channel and the low-stock policy sitting on top of both.
//
// ============================================================================

mod low_stock;
mod sink;

pub use low_stock::{LowStockNotifier, DEFAULT_LOW_STOCK_THRESHOLD};
pub use sink::{
    InMemoryPush, InMemorySink, Notification, NotificationKind, NotificationSink, NotifyError,
    RealtimePush,
};
