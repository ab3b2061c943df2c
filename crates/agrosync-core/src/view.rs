// ── View slots ──
//
// A slot holds what is rendered for one selection, such as "plots of the
// selected facility". Every load takes a ticket stamped with the slot's
// generation; starting another load bumps the generation, so a late answer
// for an earlier selection is dropped instead of overwriting the view.
// Closing the slot drops every answer that arrives afterwards.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::CoreError;
use crate::stream::StateStream;

/// What a slot currently shows.
#[derive(Debug)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(Arc<T>),
    /// The backend has no data for the selection yet.
    NoData,
    Failed(CoreError),
}

impl<T> Clone for ViewState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Loading => Self::Loading,
            Self::Ready(value) => Self::Ready(Arc::clone(value)),
            Self::NoData => Self::NoData,
            Self::Failed(err) => Self::Failed(err.clone()),
        }
    }
}

impl<T> ViewState<T> {
    pub fn ready(&self) -> Option<&Arc<T>> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Proof of which load an answer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewTicket {
    generation: u64,
}

pub struct ViewSlot<T> {
    generation: AtomicU64,
    state: watch::Sender<ViewState<T>>,
    closed: CancellationToken,
}

impl<T: Send + Sync + 'static> Default for ViewSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> ViewSlot<T> {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            state: watch::Sender::new(ViewState::Idle),
            closed: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> ViewState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<ViewState<T>> {
        StateStream::new(self.state.subscribe())
    }

    /// Start a load for a new selection. Earlier tickets become stale.
    pub fn begin(&self) -> ViewTicket {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        if !self.closed.is_cancelled() {
            self.state.send_replace(ViewState::Loading);
        }
        ViewTicket { generation }
    }

    /// Whether an answer for `ticket` would still be shown.
    pub fn is_current(&self, ticket: ViewTicket) -> bool {
        !self.closed.is_cancelled() && self.generation.load(Ordering::Acquire) == ticket.generation
    }

    /// Apply the answer for `ticket`. `Ok(None)` means "no data yet".
    /// Returns `false` when the answer was stale and dropped.
    pub fn complete(&self, ticket: ViewTicket, outcome: Result<Option<Arc<T>>, CoreError>) -> bool {
        if !self.is_current(ticket) {
            debug!(generation = ticket.generation, "dropping stale view answer");
            return false;
        }
        let next = match outcome {
            Ok(Some(value)) => ViewState::Ready(value),
            Ok(None) | Err(CoreError::NotFound { .. }) => ViewState::NoData,
            Err(err) => ViewState::Failed(err),
        };
        self.state.send_replace(next);
        true
    }

    /// `begin`, await `load`, then `complete`.
    pub async fn load<Fut>(&self, load: Fut) -> bool
    where
        Fut: Future<Output = Result<Option<Arc<T>>, CoreError>>,
    {
        let ticket = self.begin();
        let outcome = load.await;
        self.complete(ticket, outcome)
    }

    /// Stop showing anything new. The in-flight request is not cancelled.
    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn stale_answer_never_reaches_the_view() {
        let slot: ViewSlot<&'static str> = ViewSlot::new();
        let facility_a = slot.begin();
        let facility_b = slot.begin();

        assert!(slot.complete(facility_b, Ok(Some(Arc::new("plots of B")))));
        assert!(!slot.complete(facility_a, Ok(Some(Arc::new("plots of A")))));
        assert_eq!(**slot.state().ready().unwrap(), "plots of B");
    }

    #[test]
    fn not_found_is_an_empty_state() {
        let slot: ViewSlot<u8> = ViewSlot::new();
        let ticket = slot.begin();
        slot.complete(
            ticket,
            Err(CoreError::NotFound {
                resource: "plots/p-1/state".into(),
            }),
        );
        assert!(matches!(slot.state(), ViewState::NoData));
    }

    #[test]
    fn closed_slot_ignores_answers() {
        let slot: ViewSlot<u8> = ViewSlot::new();
        let ticket = slot.begin();
        slot.close();
        assert!(!slot.complete(ticket, Ok(Some(Arc::new(1)))));
        assert!(slot.state().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_order_loads_keep_the_latest_selection() {
        use std::time::Duration;

        let slot = Arc::new(ViewSlot::<String>::new());
        let slow = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move {
                slot.load(async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok(Some(Arc::new("A".to_owned())))
                })
                .await
            })
        };
        tokio::task::yield_now().await;
        let fast = slot
            .load(async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(Some(Arc::new("B".to_owned())))
            })
            .await;

        assert!(fast);
        assert!(!slow.await.unwrap());
        assert_eq!(slot.state().ready().map(|s| s.as_str()), Some("B"));
    }
}
