//! Logging bootstrap.

use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::FmtSubscriber;

/// Installs a `FmtSubscriber` with `level` as the global default.
///
/// Only the first call in a process succeeds; later calls return the error instead of
/// replacing the subscriber.
pub fn init(level: Level) -> Result<(), SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_reported() {
        // another test may have installed one already, so only the second call is certain
        let _ = init(Level::DEBUG);
        assert!(init(Level::INFO).is_err());
    }
}
