//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod directory;
pub mod notifier;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use directory::PgDirectory;
pub use notifier::InboxNotifier;
pub use test_dependencies::{InMemoryDirectory, MockNotifier, SentNotification, TestDependencies};
pub use traits::*;
