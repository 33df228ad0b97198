//! In-memory navigation stack.

use std::sync::Arc;

use campus_model::Route;
use tokio::sync::{watch, Mutex};

use crate::{NavError, Navigator};

/// A stack of routes with push / replace / back semantics.
///
/// Cheap to clone: clones share the same stack, so a screen and the gate
/// can hold the same `History`.
#[derive(Debug, Clone)]
pub struct History {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    stack: Mutex<Stack>,
    /// Mirrors the top of `stack`. Only sent to when the top changes.
    location: watch::Sender<Route>,
}

#[derive(Debug)]
struct Stack {
    entries: Vec<Route>,
    closed: bool,
}

impl History {
    /// Creates a history holding a single entry.
    pub fn new(initial: Route) -> Self {
        let (location, _) = watch::channel(initial.clone());
        Self {
            inner: Arc::new(Inner {
                stack: Mutex::new(Stack {
                    entries: vec![initial],
                    closed: false,
                }),
                location,
            }),
        }
    }

    /// Navigates forward, adding a new entry on top.
    pub async fn push(&self, route: Route) -> Result<(), NavError> {
        let mut stack = self.inner.stack.lock().await;
        if stack.closed {
            return Err(NavError::Closed);
        }
        tracing::debug!(%route, depth = stack.entries.len() + 1, "push");
        stack.entries.push(route.clone());
        self.publish(route);
        Ok(())
    }

    /// Swaps the top entry. The stack depth does not change.
    pub async fn replace(&self, route: Route) -> Result<(), NavError> {
        let mut stack = self.inner.stack.lock().await;
        if stack.closed {
            return Err(NavError::Closed);
        }
        tracing::debug!(%route, depth = stack.entries.len(), "replace");
        match stack.entries.last_mut() {
            Some(top) => *top = route.clone(),
            None => stack.entries.push(route.clone()),
        }
        self.publish(route);
        Ok(())
    }

    /// Pops the top entry and returns the route now on screen.
    ///
    /// Returns `None` (and changes nothing) when only one entry is left or
    /// the history is closed.
    pub async fn back(&self) -> Option<Route> {
        let mut stack = self.inner.stack.lock().await;
        if stack.closed || stack.entries.len() <= 1 {
            return None;
        }
        stack.entries.pop();
        let top = stack.entries.last().cloned()?;
        tracing::debug!(route = %top, depth = stack.entries.len(), "back");
        self.publish(top.clone());
        Some(top)
    }

    /// A snapshot of the whole stack, bottom first.
    pub async fn entries(&self) -> Vec<Route> {
        self.inner.stack.lock().await.entries.clone()
    }

    /// Tears the history down. Later mutations fail with
    /// [`NavError::Closed`]; watchers keep the last route.
    pub async fn close(&self) {
        self.inner.stack.lock().await.closed = true;
    }

    fn publish(&self, route: Route) {
        self.inner.location.send_if_modified(|current| {
            if *current == route {
                false
            } else {
                *current = route;
                true
            }
        });
    }
}

impl Navigator for History {
    fn current(&self) -> Route {
        self.inner.location.borrow().clone()
    }

    async fn replace(&self, route: Route) -> Result<(), NavError> {
        History::replace(self, route).await
    }

    fn watch(&self) -> watch::Receiver<Route> {
        self.inner.location.subscribe()
    }
}
