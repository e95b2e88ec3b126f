// ── Snapshot subscription ──
//
// Point-in-time access to the latest snapshot plus change notification,
// either by awaiting `changed()` or as a `Stream`.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Snapshot;

pub struct SnapshotStream {
    current: Option<Arc<Snapshot>>,
    receiver: watch::Receiver<Option<Arc<Snapshot>>>,
}

impl SnapshotStream {
    pub(crate) fn new(mut receiver: watch::Receiver<Option<Arc<Snapshot>>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The snapshot seen when this stream was created or last advanced.
    pub fn current(&self) -> Option<&Arc<Snapshot>> {
        self.current.as_ref()
    }

    /// The latest snapshot, which may be newer than [`current`](Self::current).
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next publish. Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Arc<Snapshot>> {
        loop {
            self.receiver.changed().await.ok()?;
            let snap = self.receiver.borrow_and_update().clone();
            if let Some(snap) = snap {
                self.current = Some(Arc::clone(&snap));
                return Some(snap);
            }
        }
    }

    /// Convert into a `Stream` yielding every published snapshot, starting
    /// with the current one if there is one.
    pub fn into_stream(self) -> SnapshotWatchStream {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by the store's `watch::Receiver`.
pub struct SnapshotWatchStream {
    inner: WatchStream<Option<Arc<Snapshot>>>,
}

impl Stream for SnapshotWatchStream {
    type Item = Arc<Snapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Some(snapshot))) => return Poll::Ready(Some(snapshot)),
                Poll::Ready(Some(None)) => {}
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
