use super::{format_stroke, Point, StrokeDirection, StrokeTracker};
use crate::config::StrokeConfig;
use crate::lock;
use crate::machine::notify::{Notification, Notifier};
use crossbeam_channel::{select, tick, unbounded, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{trace, warn};

const MIN_WATCH_INTERVAL: Duration = Duration::from_millis(1);

/// Samples pointer motion while one machine state is current.
///
/// `queue` never blocks. A worker thread, spawned on the first point,
/// classifies queued points every watch interval and reports growth of the
/// stroke. Dropping the sampler closes its shutdown channel; the worker exits
/// on its next wake-up and is never joined.
pub struct StrokeSampler {
    tracker: Arc<Mutex<StrokeTracker>>,
    point_tx: Sender<Point>,
    point_rx: Receiver<Point>,
    watch_interval: Duration,
    notifier: Option<Notifier>,
    worker: Option<Worker>,
}

struct Worker {
    /// Never sent on; dropping it stops the worker
    _shutdown_tx: Sender<()>,
    _handle: JoinHandle<()>,
}

impl StrokeSampler {
    #[must_use]
    pub fn new(config: &StrokeConfig, notifier: Option<Notifier>) -> Self {
        let (point_tx, point_rx) = unbounded();
        Self {
            tracker: Arc::new(Mutex::new(StrokeTracker::from_config(config))),
            point_tx,
            point_rx,
            watch_interval: config.watch_interval().max(MIN_WATCH_INTERVAL),
            notifier,
            worker: None,
        }
    }

    /// Hand a pointer sample to the worker
    pub fn queue(&mut self, point: Point) {
        if self.worker.is_none() {
            self.worker = self.spawn_worker();
        }
        // The receiver lives in `self`, so the channel cannot be disconnected.
        let _ = self.point_tx.send(point);
    }

    /// Current stroke, including every point queued so far
    #[must_use]
    pub fn strokes(&self) -> Vec<StrokeDirection> {
        let mut tracker = lock(&self.tracker);
        drain(&self.point_rx, &mut tracker, self.notifier.as_ref());
        tracker.directions().to_vec()
    }

    fn spawn_worker(&self) -> Option<Worker> {
        let (shutdown_tx, shutdown_rx) = unbounded::<()>();
        let tracker = Arc::clone(&self.tracker);
        let points = self.point_rx.clone();
        let interval = self.watch_interval;
        let notifier = self.notifier.clone();

        let spawned = thread::Builder::new()
            .name("stroke-sampler".to_string())
            .spawn(move || run_sampler(tracker, points, shutdown_rx, interval, notifier));

        match spawned {
            Ok(handle) => Some(Worker {
                _shutdown_tx: shutdown_tx,
                _handle: handle,
            }),
            Err(e) => {
                // Points still get classified on the next `strokes` call.
                warn!("Failed to spawn stroke sampler: {}", e);
                None
            }
        }
    }
}

fn run_sampler(
    tracker: Arc<Mutex<StrokeTracker>>,
    points: Receiver<Point>,
    shutdown_rx: Receiver<()>,
    interval: Duration,
    notifier: Option<Notifier>,
) {
    let ticker = tick(interval);
    loop {
        select! {
            recv(ticker) -> _ => {
                let mut tracker = lock(&tracker);
                drain(&points, &mut tracker, notifier.as_ref());
            }
            recv(shutdown_rx) -> _ => break,
        }
    }
    trace!("Stroke sampler stopped");
}

fn drain(points: &Receiver<Point>, tracker: &mut StrokeTracker, notifier: Option<&Notifier>) {
    let mut grew = false;
    for point in points.try_iter() {
        if let Some(dir) = tracker.feed_point(point) {
            trace!("Stroke direction {} at ({}, {})", dir, point.x, point.y);
            grew = true;
        }
    }

    if grew {
        let strokes = tracker.directions().to_vec();
        trace!("Stroke now {}", format_stroke(&strokes));
        if let Some(notifier) = notifier {
            notifier.send(Notification::StrokeUpdated(strokes));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StrokeDirection::*;

    fn config() -> StrokeConfig {
        StrokeConfig {
            start_threshold: 10.0,
            direction_change_threshold: 20.0,
            extension_threshold: 10.0,
            watch_interval_ms: 5,
        }
    }

    #[test]
    fn test_empty_without_points() {
        let sampler = StrokeSampler::new(&config(), None);
        assert!(sampler.strokes().is_empty());
        assert!(sampler.worker.is_none());
    }

    #[test]
    fn test_strokes_reflect_every_queued_point() {
        let mut sampler = StrokeSampler::new(&config(), None);
        for (x, y) in [(0, 0), (0, 5), (0, 12), (0, 18), (10, 20), (25, 20)] {
            sampler.queue(Point::new(x, y));
        }
        assert_eq!(sampler.strokes(), vec![Down, Right]);
        assert!(sampler.worker.is_some());
    }

    #[test]
    fn test_worker_classifies_in_background() {
        let mut sampler = StrokeSampler::new(&config(), None);
        sampler.queue(Point::new(0, 0));
        sampler.queue(Point::new(0, -50));

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !sampler.point_rx.is_empty() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(sampler.point_rx.is_empty());
        assert_eq!(lock(&sampler.tracker).directions(), &[Up]);
    }
}
