use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::Notify;

use crate::tracker::{
    GeolocationError, GeolocationProvider, PositionOptions, TrackedPosition, WatchId, WatchSink,
};

#[derive(Debug)]
struct Inner {
    supported: bool,
    fix: Result<TrackedPosition, GeolocationError>,
    watches: BTreeMap<WatchId, WatchSink>,
    next_id: u64,
    fix_requests: usize,
    last_options: Option<PositionOptions>,
    prompt_open: bool,
}

/// Scriptable location source. Clones share the same device, so a test or a
/// replay task can keep a handle and feed positions to the tracker.
#[derive(Debug, Clone)]
pub struct SimulatedGeolocation {
    inner: Arc<Mutex<Inner>>,
    prompt: Arc<Notify>,
}

impl SimulatedGeolocation {
    /// Device that answers the first fix with `fix`.
    pub fn new(fix: TrackedPosition) -> Self {
        Self::with_fix(Ok(fix))
    }

    /// Device where the user refuses the permission prompt.
    pub fn denied() -> Self {
        Self::with_fix(Err(GeolocationError::PermissionDenied))
    }

    pub fn unsupported() -> Self {
        let device = Self::with_fix(Err(GeolocationError::Unsupported));
        device.lock().supported = false;
        device
    }

    pub fn with_fix(fix: Result<TrackedPosition, GeolocationError>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                supported: true,
                fix,
                watches: BTreeMap::new(),
                next_id: 1,
                fix_requests: 0,
                last_options: None,
                prompt_open: false,
            })),
            prompt: Arc::new(Notify::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Keeps the permission prompt open: first fix requests wait until
    /// [`SimulatedGeolocation::answer_prompt`].
    pub fn hold_prompt(&self) {
        self.lock().prompt_open = true;
    }

    pub fn answer_prompt(&self) {
        self.lock().prompt_open = false;
        self.prompt.notify_waiters();
    }

    pub fn set_fix(&self, fix: Result<TrackedPosition, GeolocationError>) {
        self.lock().fix = fix;
    }

    /// Delivers one callback to every active watch. Returns how many
    /// watches received it.
    pub fn push(&self, update: Result<TrackedPosition, GeolocationError>) -> usize {
        let mut inner = self.lock();
        inner.watches.retain(|_, sink| sink.send(update).is_ok());
        inner.watches.len()
    }

    pub fn active_watches(&self) -> usize {
        self.lock().watches.len()
    }

    pub fn fix_requests(&self) -> usize {
        self.lock().fix_requests
    }

    pub fn last_options(&self) -> Option<PositionOptions> {
        self.lock().last_options
    }
}

impl GeolocationProvider for SimulatedGeolocation {
    fn is_supported(&self) -> bool {
        self.lock().supported
    }

    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> Result<TrackedPosition, GeolocationError> {
        {
            let mut inner = self.lock();
            inner.fix_requests += 1;
            inner.last_options = Some(options);
        }
        loop {
            let answered = self.prompt.notified();
            if !self.lock().prompt_open {
                break;
            }
            answered.await;
        }
        self.lock().fix
    }

    fn watch_position(
        &self,
        options: PositionOptions,
        sink: WatchSink,
    ) -> Result<WatchId, GeolocationError> {
        let mut inner = self.lock();
        if let Err(err @ (GeolocationError::PermissionDenied | GeolocationError::Unsupported)) =
            inner.fix
        {
            return Err(err);
        }
        let id = WatchId(inner.next_id);
        inner.next_id += 1;
        inner.last_options = Some(options);
        inner.watches.insert(id, sink);
        Ok(id)
    }

    fn clear_watch(&self, id: WatchId) {
        self.lock().watches.remove(&id);
    }
}
