//! Delayed, cancelable recomputation of slot assessments
//!
//! Every selection is issued a monotonically increasing `RequestToken` and
//! becomes the single pending request. One worker thread waits for the pending
//! request's deadline; a newer selection replaces the pending request and
//! resets the deadline, so superseded requests are cancelled before any work
//! is done for them.
//!
//! Global invariants enforced:
//! - At most one pending request and one worker thread per recalibrator
//! - Only the latest token's assessment is ever applied
//! - An applied assessment is never replaced by an older one
//! - A burst of selections yields exactly one applied assessment

use crate::catalog::{Catalog, TimeSlot};
use crate::{assess, SlotAssessment};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Identifies one selection; larger tokens supersede smaller ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Pending {
    token: RequestToken,
    slot: TimeSlot,
    deadline: Instant,
}

#[derive(Debug, Default)]
struct State {
    latest: Option<RequestToken>,
    pending: Option<Pending>,
    applied_token: Option<RequestToken>,
    assessment: Option<SlotAssessment>,
    discarded: u64,
    closed: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    // Worker waits here for a new pending request or its deadline
    scheduled: Condvar,
    // Callers wait here for applied assessments
    published: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        if state.pending.take().is_some() {
            state.discarded += 1;
        }
        drop(state);
        self.scheduled.notify_all();
        self.published.notify_all();
    }
}

/// Stops and joins the worker when the last recalibrator handle goes away
#[derive(Debug)]
struct Worker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shared.close();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("recalibration worker panicked");
            }
        }
    }
}

/// Schedules assessments for slot selections with last-selection-wins semantics
#[derive(Debug, Clone)]
pub struct Recalibrator {
    catalog: Arc<Catalog>,
    delay: Duration,
    shared: Arc<Shared>,
    _worker: Arc<Worker>,
}

impl Recalibrator {
    /// Start a recalibrator and its worker thread
    pub fn new(catalog: Catalog, delay: Duration) -> anyhow::Result<Self> {
        let catalog = Arc::new(catalog);
        let shared = Arc::new(Shared::default());

        let handle = {
            let catalog = Arc::clone(&catalog);
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("sentinel-recalibrate".to_string())
                .spawn(move || run_worker(&catalog, &shared))
                .context("failed to start recalibration worker")?
        };

        Ok(Recalibrator {
            catalog,
            delay,
            _worker: Arc::new(Worker {
                shared: Arc::clone(&shared),
                handle: Some(handle),
            }),
            shared,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Select a slot, cancelling any pending selection
    pub fn select(&self, slot: &TimeSlot) -> RequestToken {
        let mut state = self.shared.lock();
        let token = RequestToken(state.latest.map_or(1, |t| t.0 + 1));
        state.latest = Some(token);

        if let Some(stale) = state.pending.take() {
            state.discarded += 1;
            tracing::debug!(token = stale.token.0, slot = %stale.slot.id, "cancelled stale recalibration");
        }
        state.pending = Some(Pending {
            token,
            slot: slot.clone(),
            deadline: Instant::now() + self.delay,
        });
        drop(state);
        self.shared.scheduled.notify_all();

        tracing::debug!(token = token.0, slot = %slot.id, "scheduled recalibration");
        token
    }

    /// Select a slot by id
    pub fn select_id(&self, slot_id: &str) -> anyhow::Result<RequestToken> {
        let slot = self
            .catalog
            .slot(slot_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown time slot: {}", slot_id))?;
        Ok(self.select(&slot))
    }

    /// Token of the most recent selection
    pub fn latest_token(&self) -> Option<RequestToken> {
        self.shared.lock().latest
    }

    /// Last applied assessment
    pub fn current(&self) -> Option<SlotAssessment> {
        self.shared.lock().assessment.clone()
    }

    /// Applied token and assessment, read together
    pub fn applied(&self) -> Option<(RequestToken, SlotAssessment)> {
        let state = self.shared.lock();
        state.applied_token.zip(state.assessment.clone())
    }

    /// Token whose assessment is currently applied
    pub fn applied_token(&self) -> Option<RequestToken> {
        self.shared.lock().applied_token
    }

    /// A selection is pending and its assessment has not been applied yet
    pub fn is_calibrating(&self) -> bool {
        let state = self.shared.lock();
        state.latest.is_some() && state.applied_token != state.latest
    }

    /// Number of superseded selections dropped so far
    pub fn discarded(&self) -> u64 {
        self.shared.lock().discarded
    }

    /// Stop scheduling; pending work is dropped and blocked callers wake up
    pub fn close(&self) {
        self.shared.close();
    }

    /// Block until the latest selection's assessment is applied
    ///
    /// Returns `None` if nothing was ever selected or the recalibrator was
    /// closed before it was applied.
    pub fn wait_latest(&self) -> Option<SlotAssessment> {
        let mut state = self.shared.lock();
        loop {
            let latest = state.latest?;
            if state.applied_token == Some(latest) {
                return state.assessment.clone();
            }
            if state.closed {
                return None;
            }
            state = self
                .shared
                .published
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like `wait_latest`, giving up after `timeout`
    pub fn wait_latest_timeout(&self, timeout: Duration) -> Option<SlotAssessment> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.lock();
        loop {
            let latest = state.latest?;
            if state.applied_token == Some(latest) {
                return state.assessment.clone();
            }
            if state.closed {
                return None;
            }
            let remaining = deadline.checked_duration_since(Instant::now())?;
            let (guard, _) = self
                .shared
                .published
                .wait_timeout(state, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
    }

    /// Block until an assessment newer than `seen` is applied
    ///
    /// Returns `None` once the recalibrator is closed and nothing newer is
    /// available.
    pub fn wait_applied_after(
        &self,
        seen: Option<RequestToken>,
    ) -> Option<(RequestToken, SlotAssessment)> {
        let mut state = self.shared.lock();
        loop {
            if let Some(token) = state.applied_token {
                if Some(token) > seen {
                    if let Some(assessment) = state.assessment.clone() {
                        return Some((token, assessment));
                    }
                }
            }
            if state.closed {
                return None;
            }
            state = self
                .shared
                .published
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

fn run_worker(catalog: &Catalog, shared: &Shared) {
    let mut state = shared.lock();
    loop {
        if state.closed {
            return;
        }

        let Some(deadline) = state.pending.as_ref().map(|p| p.deadline) else {
            state = shared
                .scheduled
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
            continue;
        };

        // Re-evaluate after every wake: the pending request may have been replaced
        if let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            if !remaining.is_zero() {
                let (guard, _) = shared
                    .scheduled
                    .wait_timeout(state, remaining)
                    .unwrap_or_else(PoisonError::into_inner);
                state = guard;
                continue;
            }
        }

        let Some(pending) = state.pending.take() else {
            continue;
        };
        drop(state);

        let assessment = assess(catalog, &pending.slot);

        state = shared.lock();
        if state.latest != Some(pending.token) || state.applied_token > Some(pending.token) {
            state.discarded += 1;
            tracing::debug!(token = pending.token.0, slot = %pending.slot.id, "discarded stale recalibration");
            continue;
        }

        state.applied_token = Some(pending.token);
        state.assessment = Some(assessment);
        shared.published.notify_all();
        tracing::info!(token = pending.token.0, slot = %pending.slot.id, "applied recalibration");
    }
}
