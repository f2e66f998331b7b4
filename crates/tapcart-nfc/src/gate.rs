//! # Detection Gate
//!
//! Duplicate suppression for tag detections. A tag held against the reader
//! is seen on every poll; the gate lets one detection through and drops the
//! rest until the cooldown has passed.
//!
//! ## State Machine
//! ```text
//!              try_enter()                 permit dropped
//!   ┌──────┐ ─────────────► ┌────────────┐ ─────────────► ┌─────────────┐
//!   │ Idle │                │ Processing │                │ CoolingDown │
//!   └──────┘ ◄───────────────────────────────────────────── └─────────────┘
//!      ▲                    timer task after `cooldown`          │
//!      │                                                         │
//!      └───────────── immediately if cooldown is zero ───────────┘
//!
//!   try_enter() in Processing or CoolingDown ──► None (detection dropped)
//! ```
//!
//! Every cooldown bumps a generation counter. A timer only reopens the gate
//! if its generation is still current, so a stale timer can never cut a
//! newer cooldown short.

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// Gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GateState {
    Idle,
    Processing,
    CoolingDown,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::Idle => write!(f, "idle"),
            GateState::Processing => write!(f, "processing"),
            GateState::CoolingDown => write!(f, "cooling_down"),
        }
    }
}

struct Slot {
    state: GateState,
    generation: u64,
}

struct GateInner {
    slot: Mutex<Slot>,
    cooldown: Duration,
}

impl GateInner {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_cooldown(self: &Arc<Self>) {
        let generation = {
            let mut slot = self.lock();
            slot.generation = slot.generation.wrapping_add(1);
            if self.cooldown.is_zero() {
                slot.state = GateState::Idle;
                return;
            }
            slot.state = GateState::CoolingDown;
            slot.generation
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let inner = Arc::clone(self);
                handle.spawn(async move {
                    tokio::time::sleep(inner.cooldown).await;
                    inner.finish_cooldown(generation);
                });
            }
            Err(_) => {
                warn!("No tokio runtime for detection cooldown, reopening gate now");
                self.finish_cooldown(generation);
            }
        }
    }

    fn finish_cooldown(&self, generation: u64) {
        let mut slot = self.lock();
        if slot.generation == generation && slot.state == GateState::CoolingDown {
            slot.state = GateState::Idle;
            debug!("Detection gate reopened");
        }
    }
}

/// Three-state duplicate suppression lock. Cheap to clone.
#[derive(Clone)]
pub struct DetectionGate {
    inner: Arc<GateInner>,
}

impl DetectionGate {
    pub fn new(cooldown: Duration) -> Self {
        DetectionGate {
            inner: Arc::new(GateInner {
                slot: Mutex::new(Slot {
                    state: GateState::Idle,
                    generation: 0,
                }),
                cooldown,
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> GateState {
        self.inner.lock().state
    }

    pub fn cooldown(&self) -> Duration {
        self.inner.cooldown
    }

    /// Enters `Processing` if the gate is `Idle`.
    ///
    /// Returns `None` while a detection is being processed or cooling down.
    /// Dropping the permit starts the cooldown.
    pub fn try_enter(&self) -> Option<GatePermit> {
        let mut slot = self.inner.lock();
        if slot.state != GateState::Idle {
            return None;
        }
        slot.state = GateState::Processing;
        Some(GatePermit {
            inner: Arc::clone(&self.inner),
        })
    }

    /// Forces the gate back to `Idle` and invalidates any pending timer.
    ///
    /// An outstanding permit still starts a fresh cooldown when dropped.
    pub fn reset(&self) {
        let mut slot = self.inner.lock();
        slot.generation = slot.generation.wrapping_add(1);
        if slot.state == GateState::CoolingDown {
            slot.state = GateState::Idle;
        }
    }
}

impl fmt::Debug for DetectionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectionGate")
            .field("state", &self.state())
            .field("cooldown", &self.inner.cooldown)
            .finish()
    }
}

/// Proof of being the one detection in `Processing`.
#[must_use = "dropping the permit immediately starts the cooldown"]
pub struct GatePermit {
    inner: Arc<GateInner>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.inner.begin_cooldown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_gate_cycle() {
        let gate = DetectionGate::new(Duration::from_millis(1500));
        assert_eq!(gate.state(), GateState::Idle);

        let permit = gate.try_enter().expect("idle gate admits");
        assert_eq!(gate.state(), GateState::Processing);
        assert!(gate.try_enter().is_none());

        drop(permit);
        assert_eq!(gate.state(), GateState::CoolingDown);
        assert!(gate.try_enter().is_none());

        tokio::time::sleep(Duration::from_millis(1499)).await;
        assert_eq!(gate.state(), GateState::CoolingDown);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(gate.state(), GateState::Idle);
        assert!(gate.try_enter().is_some());
    }

    #[tokio::test]
    async fn test_zero_cooldown_reopens_immediately() {
        let gate = DetectionGate::new(Duration::ZERO);
        drop(gate.try_enter().unwrap());
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_timer_does_not_cut_new_cooldown() {
        let gate = DetectionGate::new(Duration::from_millis(1000));

        // First cooldown starts at t=0, then is reset at t=500.
        drop(gate.try_enter().unwrap());
        tokio::time::sleep(Duration::from_millis(500)).await;
        gate.reset();
        assert_eq!(gate.state(), GateState::Idle);

        // Second cooldown starts at t=500 and must last until t=1500.
        drop(gate.try_enter().unwrap());
        tokio::time::sleep(Duration::from_millis(600)).await; // t=1100
        assert_eq!(gate.state(), GateState::CoolingDown);

        tokio::time::sleep(Duration::from_millis(401)).await; // t=1501
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[test]
    fn test_without_runtime_reopens_immediately() {
        let gate = DetectionGate::new(Duration::from_millis(1500));
        drop(gate.try_enter().unwrap());
        assert_eq!(gate.state(), GateState::Idle);
    }
}
