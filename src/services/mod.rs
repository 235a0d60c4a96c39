pub mod cache;
pub mod dispatcher;
pub mod postgres;
pub mod queue;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use dispatcher::{DispatchError, DispatchReport, NotificationDispatcher};
pub use postgres::{PostgresClient, PostgresError};
pub use queue::{
    DrainReport, LogSender, NotificationQueue, NotificationSender, QueueCounts, QueueError,
    QueueItem, QueueStatus, WebhookSender,
};
