//! External collaborator contracts and their HTTP implementations.
//!
//! Each collaborator is a single-operation capability trait injected into
//! the step that needs it. Steps never reach for a module-level client, so
//! every step is testable against a hand-written fake. The real
//! implementations are thin `reqwest` clients; their endpoints are
//! overridable for tests.

mod notifier;
mod prices;
mod social;
mod summarizer;

pub use notifier::{Delivery, Notifier, TelegramConfig, TelegramNotifier};
pub use prices::{CoinGecko, PriceSource};
pub use social::{SocialSource, TwitterConfig, TwitterSearch};
pub use summarizer::{OpenAiConfig, OpenAiSummarizer, Summarizer};
