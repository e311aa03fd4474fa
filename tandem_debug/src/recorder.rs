// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`CommitSink`] and encodes events into a
//! `Vec<u8>` as little-endian records. Each record starts with a tag byte and
//! the number of microseconds since the recorder was created. [`decode`] reads
//! them back as an iterator of [`Recorded`] events.

use std::time::Instant;

use kurbo::Rect;
use tandem_core::animation::{AnimationEvent, AnimationEventKind, TargetProperty};
use tandem_core::layer::LayerKey;
use tandem_core::trace::{
    CommitBeginEvent, CommitEndEvent, CommitSink, DamageMergedEvent, DeferredPropertyEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_COMMIT_BEGIN: u8 = 1;
const TAG_COMMIT_END: u8 = 2;
const TAG_ANIMATION: u8 = 3;
const TAG_PROPERTY_DEFERRED: u8 = 4;
const TAG_DAMAGE_MERGED: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`CommitSink`] that encodes events into a compact binary buffer.
#[derive(Debug)]
pub struct RecorderSink {
    buf: Vec<u8>,
    origin: Instant,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder. Timestamps count from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            origin: Instant::now(),
        }
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn begin(&mut self, tag: u8) {
        let elapsed = self.origin.elapsed().as_micros();
        self.write_u8(tag);
        self.write_u64(u64::try_from(elapsed).unwrap_or(u64::MAX));
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_key(&mut self, key: LayerKey) {
        self.buf.extend_from_slice(&key.0.to_le_bytes());
    }

    fn write_count(&mut self, n: usize) {
        self.write_u32(u32::try_from(n).unwrap_or(u32::MAX));
    }

    fn write_property(&mut self, p: TargetProperty) {
        self.write_u8(match p {
            TargetProperty::Opacity => 0,
            TargetProperty::Transform => 1,
        });
    }

    fn write_rect(&mut self, r: Rect) {
        for v in [r.x0, r.y0, r.x1, r.y1] {
            self.write_f64(v);
        }
    }
}

impl CommitSink for RecorderSink {
    fn on_commit_begin(&mut self, e: &CommitBeginEvent) {
        self.begin(TAG_COMMIT_BEGIN);
        self.write_u64(e.commit_index);
        self.write_key(e.root);
    }

    fn on_commit_end(&mut self, e: &CommitEndEvent) {
        self.begin(TAG_COMMIT_END);
        self.write_u64(e.commit_index);
        self.write_count(e.layers_pushed);
        self.write_count(e.layers_created);
        self.write_count(e.layers_removed);
        self.write_u8(u8::from(e.structure_rebuilt));
    }

    fn on_animation_event(&mut self, e: &AnimationEvent) {
        self.begin(TAG_ANIMATION);
        self.write_u8(match e.kind {
            AnimationEventKind::Started => 0,
            AnimationEventKind::Finished => 1,
        });
        self.write_key(e.layer);
        self.write_u32(e.animation_id);
        self.write_u32(e.group);
        self.write_property(e.property);
        self.write_f64(e.monotonic_time);
    }

    fn on_property_deferred(&mut self, e: &DeferredPropertyEvent) {
        self.begin(TAG_PROPERTY_DEFERRED);
        self.write_u64(e.commit_index);
        self.write_key(e.layer);
        self.write_property(e.property);
    }

    fn on_damage_merged(&mut self, e: &DamageMergedEvent) {
        self.begin(TAG_DAMAGE_MERGED);
        self.write_u64(e.commit_index);
        self.write_key(e.layer);
        self.write_rect(e.pushed);
        self.write_rect(e.merged);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`CommitBeginEvent`].
    CommitBegin(CommitBeginEvent),
    /// A [`CommitEndEvent`]. Counts are capped at `u32::MAX`.
    CommitEnd(CommitEndEvent),
    /// An [`AnimationEvent`] delivered to the main side.
    Animation(AnimationEvent),
    /// A [`DeferredPropertyEvent`].
    PropertyDeferred(DeferredPropertyEvent),
    /// A [`DamageMergedEvent`].
    DamageMerged(DamageMergedEvent),
}

/// A decoded event with its timestamp.
#[derive(Clone, Debug)]
pub struct Recorded {
    /// Microseconds since the recorder was created.
    pub at_us: u64,
    /// The event.
    pub event: RecordedEvent,
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Recorded`] events.
///
/// Decoding stops at the first truncated record or unknown tag.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.take().map(f64::from_le_bytes)
    }

    fn read_key(&mut self) -> Option<LayerKey> {
        self.take().map(i32::from_le_bytes).map(LayerKey)
    }

    fn read_count(&mut self) -> Option<usize> {
        self.read_u32().and_then(|n| usize::try_from(n).ok())
    }

    fn read_property(&mut self) -> Option<TargetProperty> {
        Some(match self.read_u8()? {
            0 => TargetProperty::Opacity,
            _ => TargetProperty::Transform,
        })
    }

    fn read_rect(&mut self) -> Option<Rect> {
        Some(Rect::new(
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
        ))
    }

    fn decode_commit_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CommitBegin(CommitBeginEvent {
            commit_index: self.read_u64()?,
            root: self.read_key()?,
        }))
    }

    fn decode_commit_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CommitEnd(CommitEndEvent {
            commit_index: self.read_u64()?,
            layers_pushed: self.read_count()?,
            layers_created: self.read_count()?,
            layers_removed: self.read_count()?,
            structure_rebuilt: self.read_u8()? != 0,
        }))
    }

    fn decode_animation(&mut self) -> Option<RecordedEvent> {
        let kind = match self.read_u8()? {
            0 => AnimationEventKind::Started,
            _ => AnimationEventKind::Finished,
        };
        Some(RecordedEvent::Animation(AnimationEvent {
            kind,
            layer: self.read_key()?,
            animation_id: self.read_u32()?,
            group: self.read_u32()?,
            property: self.read_property()?,
            monotonic_time: self.read_f64()?,
        }))
    }

    fn decode_property_deferred(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PropertyDeferred(DeferredPropertyEvent {
            commit_index: self.read_u64()?,
            layer: self.read_key()?,
            property: self.read_property()?,
        }))
    }

    fn decode_damage_merged(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::DamageMerged(DamageMergedEvent {
            commit_index: self.read_u64()?,
            layer: self.read_key()?,
            pushed: self.read_rect()?,
            merged: self.read_rect()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Recorded;

    fn next(&mut self) -> Option<Recorded> {
        let tag = self.read_u8()?;
        let at_us = self.read_u64()?;
        let event = match tag {
            TAG_COMMIT_BEGIN => self.decode_commit_begin(),
            TAG_COMMIT_END => self.decode_commit_end(),
            TAG_ANIMATION => self.decode_animation(),
            TAG_PROPERTY_DEFERRED => self.decode_property_deferred(),
            TAG_DAMAGE_MERGED => self.decode_damage_merged(),
            _ => None,
        }?;
        Some(Recorded { at_us, event })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_decode_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_commit_begin(&CommitBeginEvent {
            commit_index: 1,
            root: LayerKey(-5),
        });
        rec.on_damage_merged(&DamageMergedEvent {
            commit_index: 1,
            layer: LayerKey(2),
            pushed: Rect::new(0.0, 0.0, 4.0, 4.0),
            merged: Rect::new(0.0, 0.0, 8.0, 4.0),
        });
        rec.on_commit_end(&CommitEndEvent {
            commit_index: 1,
            layers_pushed: 2,
            layers_created: 2,
            layers_removed: 0,
            structure_rebuilt: true,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 3);
        assert!(events.windows(2).all(|w| w[0].at_us <= w[1].at_us));
        match &events[0].event {
            RecordedEvent::CommitBegin(e) => assert_eq!(e.root, LayerKey(-5)),
            other => panic!("unexpected {other:?}"),
        }
        match &events[1].event {
            RecordedEvent::DamageMerged(e) => {
                assert_eq!(e.merged, Rect::new(0.0, 0.0, 8.0, 4.0));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &events[2].event {
            RecordedEvent::CommitEnd(e) => {
                assert_eq!(e.layers_pushed, 2);
                assert!(e.structure_rebuilt);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn animation_event_survives_recording() {
        let event = AnimationEvent {
            kind: AnimationEventKind::Started,
            layer: LayerKey(9),
            animation_id: 12,
            group: 4,
            property: TargetProperty::Transform,
            monotonic_time: 0.25,
        };
        let mut rec = RecorderSink::new();
        rec.on_animation_event(&event);
        let decoded: Vec<_> = decode(rec.as_bytes()).collect();
        match decoded.as_slice() {
            [Recorded {
                event: RecordedEvent::Animation(e),
                ..
            }] => assert_eq!(*e, event),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn truncated_recording_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_commit_begin(&CommitBeginEvent {
            commit_index: 1,
            root: LayerKey(1),
        });
        rec.on_commit_begin(&CommitBeginEvent {
            commit_index: 2,
            root: LayerKey(1),
        });
        let bytes = rec.into_bytes();
        assert_eq!(decode(&bytes[..bytes.len() - 1]).count(), 1);
    }
}
