//! Cached value for the `Date` response header.
//!
//! Formatting an HTTP date on every response is wasteful, so [`DateService`] keeps the current
//! value in an [`ArcSwap`] and, once [`start_refresh`](DateService::start_refresh) has been
//! called inside a tokio runtime, a background task re-formats it periodically.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use bytes::Bytes;
use once_cell::sync::OnceCell;
use tokio::task::JoinHandle;

const REFRESH_INTERVAL: Duration = Duration::from_millis(800);

#[derive(Debug)]
pub struct DateService {
    current: Arc<ArcSwap<Bytes>>,
    refresh: OnceCell<JoinHandle<()>>,
}

impl DateService {
    /// Creates the service holding the current date. No task is spawned yet.
    pub fn new() -> Self {
        Self { current: Arc::new(ArcSwap::from_pointee(now())), refresh: OnceCell::new() }
    }

    /// Spawns the refresh task on the current tokio runtime; later calls do nothing.
    pub fn start_refresh(&self) {
        self.refresh.get_or_init(|| {
            let current = Arc::clone(&self.current);
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(REFRESH_INTERVAL).await;
                    current.store(Arc::new(now()));
                }
            })
        });
    }

    /// Calls `f` with the current `Date` header value.
    pub fn with_http_date<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&str) -> T,
    {
        let guard = self.current.load();
        let date: &Bytes = &guard;
        // faf_http_date only writes ascii
        f(std::str::from_utf8(date).unwrap_or_default())
    }
}

impl Default for DateService {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DateService {
    fn drop(&mut self) {
        if let Some(handle) = self.refresh.get() {
            handle.abort();
        }
    }
}

fn now() -> Bytes {
    let mut buf = faf_http_date::get_date_buff_no_key();
    faf_http_date::get_date_no_key(&mut buf);
    Bytes::from_owner(buf)
}
