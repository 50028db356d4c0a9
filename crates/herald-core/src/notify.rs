//! Notification-channel port.

use async_trait::async_trait;

use herald_types::error::NotifyError;

/// Port for the asynchronous delivery channel (e.g. a Telegram chat).
///
/// Implementations must escape/encode the text safely for their markup
/// dialect without corrupting intentional emphasis markers.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}
