//! # Scan Sessions
//!
//! One continuous scan = one session: a uuid for log correlation and a
//! cancellation token the poll loop selects on.
//!
//! ```text
//!  start_continuous_scan ──► ScanSession { id, token } ──► spawned poll loop
//!            │                        ▲                          │
//!            ▼                        │ cancel()                 │ select! on
//!        ScanHandle ── stop() ────────┘                          ▼ token.cancelled()
//!                                                       in-flight read dropped
//! ```

use std::fmt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::controller::NfcController;

/// A live continuous scan.
#[derive(Clone)]
pub(crate) struct ScanSession {
    pub id: Uuid,
    pub token: CancellationToken,
}

impl ScanSession {
    pub fn new() -> Self {
        ScanSession {
            id: Uuid::new_v4(),
            token: CancellationToken::new(),
        }
    }
}

/// Handle returned by
/// [`NfcController::start_continuous_scan`](crate::NfcController::start_continuous_scan).
///
/// A no-op handle comes back when the scan could not start; stopping it does
/// nothing. Dropping a handle does not stop the scan.
pub struct ScanHandle {
    bound: Option<(NfcController, ScanSession)>,
}

impl ScanHandle {
    pub(crate) fn noop() -> Self {
        ScanHandle { bound: None }
    }

    pub(crate) fn bound(controller: NfcController, session: ScanSession) -> Self {
        ScanHandle {
            bound: Some((controller, session)),
        }
    }

    /// True while the session this handle is bound to is running.
    pub fn is_active(&self) -> bool {
        self.bound
            .as_ref()
            .is_some_and(|(_, session)| !session.token.is_cancelled())
    }

    /// True for handles that never had a session.
    pub fn is_noop(&self) -> bool {
        self.bound.is_none()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.bound.as_ref().map(|(_, session)| session.id)
    }

    /// Stops the scan. Idempotent; errors are swallowed.
    pub async fn stop(&self) {
        if let Some((controller, session)) = &self.bound {
            controller.end_session(session).await;
        }
    }
}

impl fmt::Debug for ScanHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanHandle")
            .field("session_id", &self.session_id())
            .field("active", &self.is_active())
            .finish()
    }
}
