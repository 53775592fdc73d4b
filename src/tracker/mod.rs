mod simulated;
pub use simulated::*;

use std::{future::Future, rc::Rc, time::Duration};

use chrono::Utc;
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::shared::{geo::Coordinate, time::Timestamp};

const EVENT_CAPACITY: usize = 64;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationError {
    #[error("Location permission was denied")]
    PermissionDenied,
    #[error("Location is unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Geolocation is not supported on this device")]
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the device may answer with.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedPosition {
    pub position: Coordinate,
    /// Reported accuracy radius in meters.
    pub accuracy: Option<f64>,
    pub timestamp: Timestamp,
}

impl TrackedPosition {
    pub fn new(position: Coordinate, accuracy: Option<f64>) -> Self {
        Self {
            position,
            accuracy,
            timestamp: Utc::now(),
        }
    }
}

impl From<Coordinate> for TrackedPosition {
    fn from(value: Coordinate) -> Self {
        Self::new(value, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(pub u64);

/// Receives every watch callback, successful or not.
pub type WatchSink = mpsc::UnboundedSender<Result<TrackedPosition, GeolocationError>>;

/// Device location source.
pub trait GeolocationProvider: 'static {
    fn is_supported(&self) -> bool {
        true
    }

    /// One-shot fix. This is where the device asks the user for permission.
    fn current_position(
        &self,
        options: PositionOptions,
    ) -> impl Future<Output = Result<TrackedPosition, GeolocationError>>;

    /// Starts continuous updates delivered into `sink` until cleared.
    fn watch_position(
        &self,
        options: PositionOptions,
        sink: WatchSink,
    ) -> Result<WatchId, GeolocationError>;

    fn clear_watch(&self, id: WatchId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum TrackerState {
    #[default]
    Idle,
    RequestingPermission,
    Tracking,
    /// No watch is running. Needs an explicit `start` or `stop`.
    Error(GeolocationError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerEvent {
    Position(TrackedPosition),
    Error(GeolocationError),
    Stopped,
}

struct ActiveWatch {
    id: WatchId,
    updates: mpsc::UnboundedReceiver<Result<TrackedPosition, GeolocationError>>,
}

type FixRequest = LocalBoxFuture<'static, Result<TrackedPosition, GeolocationError>>;

/// Permission and watch lifecycle around a [`GeolocationProvider`].
/// Holds at most one watch.
///
/// The first fix is requested by [`LocationTracker::request`] and resolved
/// by [`LocationTracker::next_event`], so a caller can keep handling other
/// work or [`LocationTracker::stop`] while the permission prompt is open.
pub struct LocationTracker<G: GeolocationProvider> {
    provider: Rc<G>,
    initial_fix: PositionOptions,
    watch_options: PositionOptions,
    state: TrackerState,
    pending_fix: Option<FixRequest>,
    watch: Option<ActiveWatch>,
    last_position: Option<TrackedPosition>,
    events: broadcast::Sender<TrackerEvent>,
}

impl<G: GeolocationProvider> LocationTracker<G> {
    pub fn new(provider: G, initial_fix: PositionOptions, watch_options: PositionOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            provider: Rc::new(provider),
            initial_fix,
            watch_options,
            state: TrackerState::Idle,
            pending_fix: None,
            watch: None,
            last_position: None,
            events,
        }
    }

    pub fn provider(&self) -> &G {
        &self.provider
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.state == TrackerState::Tracking
    }

    pub fn last_position(&self) -> Option<TrackedPosition> {
        self.last_position
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: TrackerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn fail(&mut self, err: GeolocationError) -> GeolocationError {
        warn!("Location tracking failed: {err}");
        self.state = TrackerState::Error(err);
        self.emit(TrackerEvent::Error(err));
        err
    }

    /// Asks the device for a first fix. The answer arrives through
    /// [`LocationTracker::next_event`]. Does nothing while already tracking
    /// or waiting on the prompt.
    pub fn request(&mut self) -> Result<TrackerState, GeolocationError> {
        if self.is_tracking() || self.pending_fix.is_some() {
            return Ok(self.state);
        }
        if !self.provider.is_supported() {
            return Err(self.fail(GeolocationError::Unsupported));
        }

        self.state = TrackerState::RequestingPermission;
        debug!("Requesting first location fix");
        let provider = Rc::clone(&self.provider);
        let options = self.initial_fix;
        self.pending_fix = Some(Box::pin(async move {
            provider.current_position(options).await
        }));
        Ok(self.state)
    }

    /// Asks for a first fix, then opens the continuous watch.
    /// Does nothing while already tracking.
    pub async fn start(&mut self) -> Result<TrackerState, GeolocationError> {
        if self.request()? == TrackerState::Tracking {
            return Ok(self.state);
        }
        match self.next_event().await {
            TrackerEvent::Error(err) => Err(err),
            _ => Ok(self.state),
        }
    }

    fn open_watch(&mut self, fix: Result<TrackedPosition, GeolocationError>) -> TrackerEvent {
        let fix = match fix {
            Ok(fix) => fix,
            Err(err) => return TrackerEvent::Error(self.fail(err)),
        };

        let (sink, updates) = mpsc::unbounded_channel();
        let id = match self.provider.watch_position(self.watch_options, sink) {
            Ok(id) => id,
            Err(err) => return TrackerEvent::Error(self.fail(err)),
        };
        self.watch = Some(ActiveWatch { id, updates });
        self.state = TrackerState::Tracking;
        self.last_position = Some(fix);
        self.emit(TrackerEvent::Position(fix));
        info!("Location tracking started at {}", fix.position);
        TrackerEvent::Position(fix)
    }

    /// Waits for the answer to a pending first fix, then for the next watch
    /// callback. Never resolves while neither is running. Transient failures
    /// are reported and the watch keeps going, a denied permission ends it.
    /// Dropping the returned future loses nothing.
    pub async fn next_event(&mut self) -> TrackerEvent {
        if let Some(request) = self.pending_fix.as_mut() {
            let fix = request.await;
            self.pending_fix = None;
            return self.open_watch(fix);
        }
        let Some(watch) = self.watch.as_mut() else {
            return std::future::pending().await;
        };
        let update = watch.updates.recv().await;
        match update {
            Some(Ok(position)) => {
                self.last_position = Some(position);
                self.emit(TrackerEvent::Position(position));
                TrackerEvent::Position(position)
            }
            Some(Err(GeolocationError::PermissionDenied)) => {
                self.clear_watch();
                TrackerEvent::Error(self.fail(GeolocationError::PermissionDenied))
            }
            Some(Err(err)) => {
                debug!("Transient location error: {err}");
                self.emit(TrackerEvent::Error(err));
                TrackerEvent::Error(err)
            }
            None => {
                self.clear_watch();
                TrackerEvent::Error(self.fail(GeolocationError::PositionUnavailable))
            }
        }
    }

    fn clear_watch(&mut self) {
        if let Some(watch) = self.watch.take() {
            self.provider.clear_watch(watch.id);
        }
        self.last_position = None;
    }

    /// Cancels the watch or an unanswered first fix and returns to idle.
    /// Returns false when there was nothing to stop.
    pub fn stop(&mut self) -> bool {
        let was_idle =
            self.state == TrackerState::Idle && self.watch.is_none() && self.pending_fix.is_none();
        self.pending_fix = None;
        self.clear_watch();
        self.state = TrackerState::Idle;
        if !was_idle {
            self.emit(TrackerEvent::Stopped);
            info!("Location tracking stopped");
        }
        !was_idle
    }
}

impl<G: GeolocationProvider> Drop for LocationTracker<G> {
    fn drop(&mut self) {
        self.clear_watch();
    }
}
