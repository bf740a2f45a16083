// Service exports
pub mod memory;
pub mod notifications;
pub mod postgres;

pub use memory::InMemoryStore;
pub use notifications::{LogNotifier, WebhookNotifier};
pub use postgres::PostgresClient;
