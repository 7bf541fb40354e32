//! Background cache-warmer: started only after `DONE`, periodically
//! re-touches loaded font files so the OS page cache stays warm. Sleeps
//! on the cancel signal rather than a bare `sleep`, so cancellation wakes
//! it immediately instead of waiting out the interval.

use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use super::cancel::CancelToken;

/// Spawn the warmer thread over `paths`, polling `cancel` every
/// `poll_interval` and re-reading the whole set every `full_interval`.
pub fn spawn(paths: Vec<PathBuf>, full_interval: Duration, cancel: CancelToken) -> JoinHandle<()> {
    thread::spawn(move || {
        let poll_interval = Duration::from_millis(200).min(full_interval);
        let mut elapsed = Duration::ZERO;
        loop {
            if cancel.is_cancelled() {
                return;
            }
            if elapsed >= full_interval {
                for path in &paths {
                    if cancel.is_cancelled() {
                        return;
                    }
                    if let Err(e) = std::fs::read(path) {
                        warn!(path = %path.display(), error = %e, "cache warmer could not re-touch font file");
                    } else {
                        debug!(path = %path.display(), "cache warmer re-touched font file");
                    }
                }
                elapsed = Duration::ZERO;
            }
            thread::sleep(poll_interval);
            elapsed += poll_interval;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelling_stops_the_warmer_promptly() {
        let cancel = CancelToken::new();
        let handle = spawn(Vec::new(), Duration::from_secs(3600), cancel.clone());
        cancel.cancel();
        handle.join().unwrap();
    }
}
