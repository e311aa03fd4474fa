// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A compositor thread for exercising the commit across a real thread
//! boundary.
//!
//! [`CompositorThread`] spawns a std thread that owns a
//! [`MirrorTree`](tandem_core::mirror::MirrorTree). The main thread keeps its
//! [`LayerStore`] and talks to the compositor over channels. A commit is an
//! ownership ping-pong: the compositor hands its tree to the main thread,
//! the main side pushes into it, and the tree is handed back. Neither side
//! ever sees the other's tree while the other can mutate it.
//!
//! ```text
//!   main thread                          compositor thread
//!   ───────────                          ─────────────────
//!   commit() ── BeginCommit ───────────▶ (takes tree out)
//!            ◀───────────────── tree ───
//!   LayerStore::commit(tree)
//!            ── EndCommit(tree) ───────▶ (owns tree again)
//!            ◀────────────────── ack ───
//!   animate() ─────────────────────────▶ MirrorTree::animate
//!            ◀──────── AnimationEvent ───
//! ```

use core::fmt;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

use kurbo::{Rect, Vec2};
use tandem_core::animation::AnimationEvent;
use tandem_core::layer::{LayerId, LayerKey, LayerStore};
use tandem_core::mirror::{MirrorLayer, MirrorTree, ScrollDelta};
use tandem_core::sync::CommitChanges;
use tandem_core::trace::Tracer;

/// The compositor thread exited (or panicked) before answering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositorGone;

impl fmt::Display for CompositorGone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("compositor thread is gone")
    }
}

impl core::error::Error for CompositorGone {}

enum Request {
    BeginCommit(Sender<MirrorTree>),
    EndCommit(MirrorTree, Sender<()>),
    Animate(f64, Sender<Vec<AnimationEvent>>),
    ScrollBy(LayerKey, Vec2, Sender<Option<Vec2>>),
    CollectScrollDeltas(Sender<Vec<ScrollDelta>>),
    Draw(Sender<Vec<(LayerKey, Rect)>>),
    Snapshot(LayerKey, Sender<Option<MirrorLayer>>),
}

/// Handle to a thread that owns the compositor-side tree.
///
/// Dropping the handle stops the thread and waits for it.
pub struct CompositorThread {
    requests: Option<Sender<Request>>,
    handle: Option<JoinHandle<()>>,
}

impl fmt::Debug for CompositorThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositorThread")
            .field("running", &self.requests.is_some())
            .finish_non_exhaustive()
    }
}

impl CompositorThread {
    /// Spawns a compositor thread with an empty mirror tree.
    #[must_use]
    pub fn spawn() -> Self {
        let (send, recv) = channel();
        let handle = thread::spawn(move || run(&recv));
        Self {
            requests: Some(send),
            handle: Some(handle),
        }
    }

    /// Commits the tree rooted at `root` into the compositor's mirror tree.
    ///
    /// Blocks until the compositor owns the updated tree again.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`LayerStore::commit`]. The
    /// compositor is then left with an empty tree, which the next commit
    /// rebuilds.
    pub fn commit(
        &mut self,
        store: &mut LayerStore,
        root: LayerId,
        tracer: &mut Tracer<'_>,
    ) -> Result<CommitChanges, CompositorGone> {
        let mut tree = self.call(Request::BeginCommit)?;
        let changes = store.commit(root, &mut tree, tracer);
        self.call(|ack| Request::EndCommit(tree, ack))?;
        Ok(changes)
    }

    /// Runs one compositor animation frame at `monotonic_time`.
    pub fn animate(&mut self, monotonic_time: f64) -> Result<Vec<AnimationEvent>, CompositorGone> {
        self.call(|reply| Request::Animate(monotonic_time, reply))
    }

    /// Scrolls a layer on the compositor without involving the main side.
    ///
    /// Returns the unused part of `delta`, or `None` if the layer is missing
    /// or not scrollable.
    pub fn scroll_by(&mut self, layer: LayerKey, delta: Vec2) -> Result<Option<Vec2>, CompositorGone> {
        self.call(|reply| Request::ScrollBy(layer, delta, reply))
    }

    /// Collects the scroll deltas the main side has not absorbed yet.
    pub fn collect_scroll_deltas(&mut self) -> Result<Vec<ScrollDelta>, CompositorGone> {
        self.call(Request::CollectScrollDeltas)
    }

    /// Simulates drawing a frame.
    ///
    /// Returns the pending damage of every mirror that had some, then clears
    /// damage and stacking flags.
    pub fn draw(&mut self) -> Result<Vec<(LayerKey, Rect)>, CompositorGone> {
        self.call(Request::Draw)
    }

    /// Returns a copy of one mirror layer.
    pub fn layer(&mut self, key: LayerKey) -> Result<Option<MirrorLayer>, CompositorGone> {
        self.call(|reply| Request::Snapshot(key, reply))
    }

    /// Delivers compositor feedback to the main side.
    ///
    /// Ticks the compositor animations, routes the resulting events into
    /// `store`, and applies outstanding scroll deltas. Returns the delivered
    /// events.
    pub fn pump_feedback(
        &mut self,
        store: &mut LayerStore,
        monotonic_time: f64,
        tracer: &mut Tracer<'_>,
    ) -> Result<Vec<AnimationEvent>, CompositorGone> {
        let events = self.animate(monotonic_time)?;
        store.dispatch_animation_events(&events, tracer);
        let deltas = self.collect_scroll_deltas()?;
        store.apply_scroll_deltas(&deltas);
        Ok(events)
    }

    /// Stops the thread and waits for it.
    ///
    /// Returns an error if the thread panicked.
    pub fn shutdown(mut self) -> Result<(), CompositorGone> {
        self.stop()
    }

    fn call<T>(&self, request: impl FnOnce(Sender<T>) -> Request) -> Result<T, CompositorGone> {
        let requests = self.requests.as_ref().ok_or(CompositorGone)?;
        let (reply, answer) = channel();
        requests.send(request(reply)).map_err(|_| CompositorGone)?;
        answer.recv().map_err(|_| CompositorGone)
    }

    fn stop(&mut self) -> Result<(), CompositorGone> {
        // Closing the channel ends the thread's receive loop.
        self.requests = None;
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| CompositorGone),
            None => Ok(()),
        }
    }
}

impl Drop for CompositorThread {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn run(requests: &Receiver<Request>) {
    let mut tree = MirrorTree::new();
    // Replies go to a caller that may have given up; send errors are ignored.
    while let Ok(request) = requests.recv() {
        match request {
            Request::BeginCommit(reply) => {
                let _ = reply.send(core::mem::take(&mut tree));
            }
            Request::EndCommit(committed, ack) => {
                tree = committed;
                let _ = ack.send(());
            }
            Request::Animate(time, reply) => {
                let mut events = Vec::new();
                tree.animate(time, &mut events);
                let _ = reply.send(events);
            }
            Request::ScrollBy(layer, delta, reply) => {
                let _ = reply.send(tree.scroll_by(layer, delta));
            }
            Request::CollectScrollDeltas(reply) => {
                let _ = reply.send(tree.collect_scroll_deltas());
            }
            Request::Draw(reply) => {
                let damage = tree
                    .iter()
                    .filter(|l| !l.update_rect().is_zero_area())
                    .map(|l| (l.key(), l.update_rect()))
                    .collect();
                tree.reset_change_tracking();
                let _ = reply.send(damage);
            }
            Request::Snapshot(key, reply) => {
                let _ = reply.send(tree.layer(key).cloned());
            }
        }
    }
}
