// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`CommitSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use kurbo::Rect;
use tandem_core::animation::{AnimationEvent, AnimationEventKind};
use tandem_core::trace::{
    CommitBeginEvent, CommitEndEvent, CommitSink, DamageMergedEvent, DeferredPropertyEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn rect(r: Rect) -> String {
    format!("({}, {})-({}, {})", r.x0, r.y0, r.x1, r.y1)
}

impl<W: Write> CommitSink for PrettyPrintSink<W> {
    fn on_commit_begin(&mut self, e: &CommitBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[commit:begin] commit={} root={}",
            e.commit_index, e.root.0,
        );
    }

    fn on_commit_end(&mut self, e: &CommitEndEvent) {
        let structure = if e.structure_rebuilt { "rebuilt" } else { "kept" };
        let _ = writeln!(
            self.writer,
            "[commit:end] commit={} pushed={} created={} removed={} structure={structure}",
            e.commit_index, e.layers_pushed, e.layers_created, e.layers_removed,
        );
    }

    fn on_animation_event(&mut self, e: &AnimationEvent) {
        let kind = match e.kind {
            AnimationEventKind::Started => "started",
            AnimationEventKind::Finished => "finished",
        };
        let _ = writeln!(
            self.writer,
            "[animation:{kind}] layer={} id={} group={} property={:?} at {:.3}s",
            e.layer.0, e.animation_id, e.group, e.property, e.monotonic_time,
        );
    }

    fn on_property_deferred(&mut self, e: &DeferredPropertyEvent) {
        let _ = writeln!(
            self.writer,
            "[deferred] commit={} layer={} property={:?}",
            e.commit_index, e.layer.0, e.property,
        );
    }

    fn on_damage_merged(&mut self, e: &DamageMergedEvent) {
        let _ = writeln!(
            self.writer,
            "[damage] commit={} layer={} pushed={} merged={}",
            e.commit_index,
            e.layer.0,
            rect(e.pushed),
            rect(e.merged),
        );
    }
}
