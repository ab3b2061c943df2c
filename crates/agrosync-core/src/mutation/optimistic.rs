// ── Optimistic state ──
//
// Holds two copies of a value: `committed`, the last state the backend
// acknowledged, and `displayed`, what the operator sees. A mutation shows
// its proposed state at once and either commits it on acknowledgment or
// rolls displayed back to committed.

use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;
use tracing::warn;

use crate::error::CoreError;
use crate::stream::StateStream;

pub struct OptimisticState<T> {
    committed: ArcSwap<T>,
    displayed: watch::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> OptimisticState<T> {
    pub fn new(initial: T) -> Self {
        let initial = Arc::new(initial);
        Self {
            committed: ArcSwap::new(Arc::clone(&initial)),
            displayed: watch::Sender::new(initial),
        }
    }

    /// Last acknowledged value.
    pub fn committed(&self) -> Arc<T> {
        self.committed.load_full()
    }

    /// Value currently shown, which may be an unacknowledged proposal.
    pub fn displayed(&self) -> Arc<T> {
        Arc::clone(&self.displayed.borrow())
    }

    pub fn subscribe(&self) -> StateStream<Arc<T>> {
        StateStream::new(self.displayed.subscribe())
    }

    /// Make `value` both committed and displayed.
    pub fn commit(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.committed.store(Arc::clone(&value));
        self.displayed.send_replace(Arc::clone(&value));
        value
    }

    /// Show `value` without committing it.
    pub fn propose(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.displayed.send_replace(Arc::clone(&value));
        value
    }

    /// Show the last committed value again.
    pub fn rollback(&self) -> Arc<T> {
        let committed = self.committed.load_full();
        self.displayed.send_replace(Arc::clone(&committed));
        committed
    }

    /// Propose `next`, send it with `send`, then commit the acknowledged
    /// value or roll back. Concurrent calls are not ordered: whichever
    /// acknowledgment arrives last is committed.
    pub async fn apply<F, Fut>(&self, next: T, send: F) -> Result<Arc<T>, CoreError>
    where
        F: FnOnce(Arc<T>) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let proposed = self.propose(next);
        match send(proposed).await {
            Ok(acknowledged) => Ok(self.commit(acknowledged)),
            Err(err) => {
                warn!(error = %err, "mutation failed, rolling back");
                self.rollback();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_commits_the_acknowledged_value() {
        let state = OptimisticState::new(vec![1]);
        let out = state
            .apply(vec![1, 2], |p| async move { Ok((*p).clone()) })
            .await
            .unwrap();
        assert_eq!(*out, vec![1, 2]);
        assert_eq!(*state.committed(), vec![1, 2]);
        assert_eq!(*state.displayed(), vec![1, 2]);
    }

    #[tokio::test]
    async fn failure_rolls_back_to_last_committed() {
        let state = OptimisticState::new(vec![1]);
        state
            .apply(vec![1, 2], |p| async move { Ok((*p).clone()) })
            .await
            .unwrap();

        let err = state
            .apply(vec![1, 2, 3], |_| async {
                Err(CoreError::Transient {
                    message: "down".into(),
                    status: Some(503),
                })
            })
            .await
            .unwrap_err();

        assert!(err.is_transient());
        assert_eq!(*state.displayed(), vec![1, 2]);
        assert_eq!(*state.committed(), vec![1, 2]);
    }

    #[tokio::test]
    async fn proposal_is_visible_before_acknowledgment() {
        use futures_util::StreamExt;

        let state = Arc::new(OptimisticState::new(0_u32));
        let mut updates = state.subscribe().into_stream();
        assert_eq!(*updates.next().await.unwrap(), 0);
        let (release, wait) = tokio::sync::oneshot::channel::<()>();

        let task = {
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                state
                    .apply(5, |p| async move {
                        wait.await.ok();
                        Ok(*p)
                    })
                    .await
            })
        };

        assert_eq!(*updates.next().await.unwrap(), 5);
        assert_eq!(*state.committed(), 0);
        release.send(()).unwrap();
        task.await.unwrap().unwrap();
        assert_eq!(*state.committed(), 5);
    }
}
