//! Lazily-initialized, mutex-guarded detector shared by all workers.

use super::{Detection, Detector};
use crate::error::DetectionError;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use tracing::{debug, info};

/// Builds the underlying detector. Called at most once per [`SharedDetector`].
pub type DetectorFactory =
    Box<dyn Fn() -> Result<Box<dyn Detector>, DetectionError> + Send + Sync>;

/// Process-wide detector handle.
///
/// The first call to [`detect`](Self::detect) runs the factory; later calls
/// reuse the instance. If the factory fails, that failure is remembered and
/// returned to every caller instead of retrying model construction per file.
pub struct SharedDetector {
    factory: DetectorFactory,
    instance: OnceLock<Result<Mutex<Box<dyn Detector>>, DetectionError>>,
}

impl SharedDetector {
    /// Create a handle that builds its detector lazily through `factory`
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Detector>, DetectionError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            instance: OnceLock::new(),
        }
    }

    /// Wrap an already-constructed detector
    pub fn from_detector(detector: Box<dyn Detector>) -> Self {
        let shared = Self::new(|| {
            Err(DetectionError::Unavailable(
                "detector was supplied pre-built".to_string(),
            ))
        });
        let _ = shared.instance.set(Ok(Mutex::new(detector)));
        shared
    }

    /// Whether the underlying detector has been constructed yet
    pub fn is_initialized(&self) -> bool {
        self.instance.get().is_some()
    }

    /// Run detection on `path`, constructing the detector on first use
    pub fn detect(&self, path: &Path) -> Result<Vec<Detection>, DetectionError> {
        let instance = self.instance.get_or_init(|| {
            info!("initializing detector");
            (self.factory)().map(Mutex::new)
        });

        let detector = instance.as_ref().map_err(Clone::clone)?;
        let mut guard = detector
            .lock()
            .map_err(|_| DetectionError::Unavailable("detector lock poisoned".to_string()))?;

        debug!(path = %path.display(), "running detection");
        guard.detect(path)
    }
}

impl std::fmt::Debug for SharedDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedDetector")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detector::BoundingBox;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    struct CountingDetector {
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
    }

    impl Detector for CountingDetector {
        fn detect(&mut self, _path: &Path) -> Result<Vec<Detection>, DetectionError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(2));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![Detection::new("FACE", BoundingBox::new(0, 0, 1, 1))])
        }
    }

    #[test]
    fn factory_runs_once_and_calls_are_serialized() {
        let builds = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));

        let shared = {
            let builds = Arc::clone(&builds);
            let max_in_flight = Arc::clone(&max_in_flight);
            Arc::new(SharedDetector::new(move || {
                builds.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(CountingDetector {
                    in_flight: Arc::new(AtomicUsize::new(0)),
                    max_in_flight: Arc::clone(&max_in_flight),
                }) as Box<dyn Detector>)
            }))
        };

        assert!(!shared.is_initialized());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || shared.detect(Path::new("a.jpg")).unwrap().len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }

        assert!(shared.is_initialized());
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn factory_failure_is_reported_to_every_caller() {
        let builds = Arc::new(AtomicUsize::new(0));
        let shared = {
            let builds = Arc::clone(&builds);
            SharedDetector::new(move || {
                builds.fetch_add(1, Ordering::SeqCst);
                Err(DetectionError::Unavailable("model missing".to_string()))
            })
        };

        for _ in 0..3 {
            let error = shared.detect(Path::new("a.jpg")).unwrap_err();
            assert!(error.to_string().contains("model missing"));
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn prebuilt_detector_skips_factory() {
        let shared = SharedDetector::from_detector(Box::new(CountingDetector {
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }));
        assert!(shared.is_initialized());
        assert_eq!(shared.detect(Path::new("a.jpg")).unwrap().len(), 1);
    }
}
