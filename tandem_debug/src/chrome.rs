// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Commits become duration slices on the main thread track; animation events
//! land on the compositor track.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use kurbo::Rect;
use serde_json::{Value, json};
use tandem_core::animation::AnimationEventKind;

use crate::recorder::{Recorded, RecordedEvent, decode};

const MAIN_TID: u32 = 0;
const COMPOSITOR_TID: u32 = 1;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for Recorded { at_us, event } in decode(bytes) {
        match event {
            RecordedEvent::CommitBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Commit",
                    "cat": "Commit",
                    "ts": at_us,
                    "pid": 0,
                    "tid": MAIN_TID,
                    "args": {
                        "commit_index": e.commit_index,
                        "root": e.root.0,
                    }
                }));
            }
            RecordedEvent::CommitEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "Commit",
                    "cat": "Commit",
                    "ts": at_us,
                    "pid": 0,
                    "tid": MAIN_TID,
                    "args": {
                        "commit_index": e.commit_index,
                        "layers_pushed": e.layers_pushed,
                        "layers_created": e.layers_created,
                        "layers_removed": e.layers_removed,
                        "structure_rebuilt": e.structure_rebuilt,
                    }
                }));
            }
            RecordedEvent::Animation(e) => {
                let name = match e.kind {
                    AnimationEventKind::Started => "AnimationStarted",
                    AnimationEventKind::Finished => "AnimationFinished",
                };
                events.push(json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Animation",
                    "ts": at_us,
                    "pid": 0,
                    "tid": COMPOSITOR_TID,
                    "s": "t",
                    "args": {
                        "layer": e.layer.0,
                        "animation_id": e.animation_id,
                        "group": e.group,
                        "property": format!("{:?}", e.property),
                        "monotonic_time": e.monotonic_time,
                    }
                }));
            }
            RecordedEvent::PropertyDeferred(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "PropertyDeferred",
                    "cat": "Rich",
                    "ts": at_us,
                    "pid": 0,
                    "tid": MAIN_TID,
                    "s": "t",
                    "args": {
                        "commit_index": e.commit_index,
                        "layer": e.layer.0,
                        "property": format!("{:?}", e.property),
                    }
                }));
            }
            RecordedEvent::DamageMerged(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "DamageMerged",
                    "cat": "Rich",
                    "ts": at_us,
                    "pid": 0,
                    "tid": MAIN_TID,
                    "s": "t",
                    "args": {
                        "commit_index": e.commit_index,
                        "layer": e.layer.0,
                        "pushed": rect(e.pushed),
                        "merged": rect(e.merged),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn rect(r: Rect) -> Value {
    json!([r.x0, r.y0, r.x1, r.y1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use tandem_core::animation::{AnimationEvent, TargetProperty};
    use tandem_core::layer::LayerKey;
    use tandem_core::trace::{CommitBeginEvent, CommitEndEvent, CommitSink};

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_commit_begin(&CommitBeginEvent {
            commit_index: 1,
            root: LayerKey(1),
        });
        rec.on_commit_end(&CommitEndEvent {
            commit_index: 1,
            layers_pushed: 4,
            layers_created: 4,
            layers_removed: 0,
            structure_rebuilt: true,
        });
        rec.on_animation_event(&AnimationEvent {
            kind: AnimationEventKind::Started,
            layer: LayerKey(2),
            animation_id: 1,
            group: 1,
            property: TargetProperty::Opacity,
            monotonic_time: 0.0,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "Commit");

        assert_eq!(parsed[1]["ph"], "E");
        assert_eq!(parsed[1]["args"]["layers_pushed"], 4);

        assert_eq!(parsed[2]["name"], "AnimationStarted");
        assert_eq!(parsed[2]["tid"], COMPOSITOR_TID);
        assert_eq!(parsed[2]["args"]["property"], "Opacity");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
