pub mod message;
pub mod notifier;
pub mod providers;

pub use message::AlertMessage;
pub use notifier::{Notifier, NotifyError};
pub use providers::{TelegramConfig, TelegramNotifier};
