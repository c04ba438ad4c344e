//! Latency bound around a slow or remote classifier.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::{Classification, Classifier, ClassifierError, ClassifierResult};

/// Workers allowed to run at once, timed-out ones included.
const MAX_WORKERS: usize = 4;

/// Runs the inner classifier on a worker thread and stops waiting after
/// `timeout`. A timed-out worker is detached and its result discarded; it
/// keeps its slot until the inner call returns, so a stuck classifier makes
/// further calls fail fast with `Unavailable` instead of piling up threads.
pub struct TimeoutClassifier {
    inner: Arc<dyn Classifier>,
    timeout: Duration,
    workers: Arc<AtomicUsize>,
}

impl TimeoutClassifier {
    pub fn new(inner: Arc<dyn Classifier>, timeout: Duration) -> Self {
        Self {
            inner,
            timeout,
            workers: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// One occupied worker slot, released on drop (also when the worker panics).
struct WorkerSlot(Arc<AtomicUsize>);

impl WorkerSlot {
    fn acquire(workers: &Arc<AtomicUsize>) -> Option<Self> {
        workers
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < MAX_WORKERS).then_some(n + 1)
            })
            .ok()
            .map(|_| Self(Arc::clone(workers)))
    }
}

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Classifier for TimeoutClassifier {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn classify(&self, text: &str) -> ClassifierResult<Classification> {
        let slot = WorkerSlot::acquire(&self.workers).ok_or_else(|| {
            ClassifierError::Unavailable(format!("{} classifier calls still running", MAX_WORKERS))
        })?;

        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();

        thread::Builder::new()
            .name("classifier".into())
            .spawn(move || {
                let result = inner.classify(&text);
                drop(slot);
                // Receiver may be gone after a timeout
                let _ = tx.send(result);
            })
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                Err(ClassifierError::Timeout(self.timeout.as_millis() as u64))
            }
            Err(RecvTimeoutError::Disconnected) => Err(ClassifierError::Unavailable(
                "classifier worker exited without a result".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowClassifier(Duration);

    impl Classifier for SlowClassifier {
        fn name(&self) -> &str {
            "slow"
        }

        fn classify(&self, _text: &str) -> ClassifierResult<Classification> {
            thread::sleep(self.0);
            Classification::checked("Influenza", 0.9)
        }
    }

    struct PanickingClassifier;

    impl Classifier for PanickingClassifier {
        fn name(&self) -> &str {
            "panics"
        }

        fn classify(&self, _text: &str) -> ClassifierResult<Classification> {
            panic!("model crashed")
        }
    }

    #[test]
    fn test_fast_classifier_passes_through() {
        let c = TimeoutClassifier::new(
            Arc::new(SlowClassifier(Duration::from_millis(0))),
            Duration::from_secs(5),
        );
        assert_eq!(c.classify("fever").unwrap().label, "Influenza");
        assert_eq!(c.name(), "slow");
    }

    #[test]
    fn test_slow_classifier_times_out() {
        let c = TimeoutClassifier::new(
            Arc::new(SlowClassifier(Duration::from_millis(500))),
            Duration::from_millis(20),
        );
        assert!(matches!(c.classify("fever"), Err(ClassifierError::Timeout(20))));
    }

    struct CountingClassifier {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl Classifier for CountingClassifier {
        fn name(&self) -> &str {
            "counting"
        }

        fn classify(&self, _text: &str) -> ClassifierResult<Classification> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            Classification::checked("Influenza", 0.9)
        }
    }

    #[test]
    fn test_stuck_classifier_does_not_stack_workers() {
        let inner = Arc::new(CountingClassifier {
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(400),
        });
        let c = TimeoutClassifier::new(inner.clone(), Duration::from_millis(5));

        let results: Vec<_> = (0..20).map(|_| c.classify("fever")).collect();

        let timeouts = results
            .iter()
            .filter(|r| matches!(r, Err(ClassifierError::Timeout(_))))
            .count();
        let refused = results
            .iter()
            .filter(|r| matches!(r, Err(ClassifierError::Unavailable(_))))
            .count();
        assert_eq!(timeouts, MAX_WORKERS);
        assert_eq!(refused, 20 - MAX_WORKERS);
        assert_eq!(inner.calls.load(Ordering::SeqCst), MAX_WORKERS);
        assert_eq!(c.workers.load(Ordering::SeqCst), MAX_WORKERS);
    }

    #[test]
    fn test_slots_released_after_workers_finish() {
        let inner = Arc::new(CountingClassifier {
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(50),
        });
        let c = TimeoutClassifier::new(inner, Duration::from_millis(5));

        for _ in 0..MAX_WORKERS {
            assert!(matches!(c.classify("fever"), Err(ClassifierError::Timeout(_))));
        }
        assert!(matches!(c.classify("fever"), Err(ClassifierError::Unavailable(_))));

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while c.workers.load(Ordering::SeqCst) > 0 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(c.workers.load(Ordering::SeqCst), 0);

        let c = TimeoutClassifier::new(
            Arc::new(SlowClassifier(Duration::from_millis(0))),
            Duration::from_secs(5),
        );
        for _ in 0..(MAX_WORKERS * 3) {
            assert!(c.classify("fever").is_ok());
        }
    }

    #[test]
    fn test_panicking_classifier_is_unavailable() {
        let c = TimeoutClassifier::new(Arc::new(PanickingClassifier), Duration::from_secs(5));
        assert!(matches!(c.classify("fever"), Err(ClassifierError::Unavailable(_))));
    }
}
