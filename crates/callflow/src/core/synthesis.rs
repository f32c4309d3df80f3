//! Message synthesis
//!
//! Turns a flat set of call records into the ordered list of directed messages
//! that sequence renderers draw.
//!
//! Each call expands into a start event and, once it has ended, an end event.
//! Events are laid out on the call-order axis: a start sits at its call id and
//! an end at its response id, both drawn from one counter in program order.
//! A call whose end directly follows its own start had nothing else happen in
//! between and is drawn as a synchronous call/return pair. Anything else opens
//! an activation that a later return closes. Synchronous self-calls carry no
//! cross-actor information and are dropped entirely.
//!
//! The engine assumes ingestion hands it exactly one record per call id with
//! ids assigned in true program order. Duplicate or out-of-order ids are not
//! detected here; they only make the classification meaningless.

use tracing::{debug, span, trace, Level};

use super::types::{ArrowKind, CallRecord, Message};

/// Start sorts before End on the same position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    Start,
    End,
}

#[derive(Debug, Clone, Copy)]
struct CallEvent<'a> {
    kind: EventKind,
    call: &'a CallRecord,
}

impl CallEvent<'_> {
    /// Position on the call-order axis
    fn position(&self) -> u64 {
        match self.kind {
            EventKind::Start => self.call.call_id,
            EventKind::End => return_key(self.call),
        }
    }

    fn is(&self, kind: EventKind, call_id: u64) -> bool {
        self.kind == kind && self.call.call_id == call_id
    }
}

/// Response id of a finished call, or the far end of the axis when unset
fn return_key(call: &CallRecord) -> u64 {
    call.response_id.unwrap_or(u64::MAX)
}

/// Expand calls into start/end events in pairing order
fn expand_events(calls: &[CallRecord]) -> Vec<CallEvent<'_>> {
    let mut events = Vec::with_capacity(calls.len() * 2);
    for call in calls {
        events.push(CallEvent {
            kind: EventKind::Start,
            call,
        });
        if !call.outcome.is_pending() {
            events.push(CallEvent {
                kind: EventKind::End,
                call,
            });
        }
    }
    events.sort_by_key(|event| (event.position(), event.kind, event.call.call_id));
    events
}

/// Synthesize the ordered message list for a set of calls
///
/// Pure and deterministic: the same input always yields the same output.
///
/// # Example
/// ```
/// use callflow::{synthesize, ArrowKind, CallRecord, Container};
///
/// let ui = Container::person("app", "user");
/// let api = Container::system("app", "api");
/// let calls = vec![CallRecord::new(1, ui, api, "login", 0).completed(2, 10, "ok")];
///
/// let messages = synthesize(&calls);
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[0].arrow, ArrowKind::SyncCall);
/// assert_eq!(messages[1].comment.as_deref(), Some("login -> ok"));
/// ```
pub fn synthesize(calls: &[CallRecord]) -> Vec<Message> {
    let synth_span = span!(Level::DEBUG, "synthesize", call_count = calls.len());
    let _enter = synth_span.enter();

    let events = expand_events(calls);
    trace!(event_count = events.len(), "Events expanded");

    let mut messages = Vec::with_capacity(events.len());
    let mut elided = 0usize;

    for (i, event) in events.iter().enumerate() {
        let call = event.call;
        match event.kind {
            EventKind::Start => {
                let synchronous = events
                    .get(i + 1)
                    .is_some_and(|next| next.is(EventKind::End, call.call_id));
                let self_call = call.is_self_call();

                if synchronous && self_call {
                    trace!(call_id = call.call_id, "Eliding synchronous self-call");
                    elided += 1;
                    continue;
                }

                let arrow = if self_call {
                    ArrowKind::SelfCall
                } else if synchronous {
                    ArrowKind::SyncCall
                } else {
                    ArrowKind::AsyncOpen
                };

                messages.push(Message {
                    call_id: call.call_id,
                    sequence_key: call.call_id,
                    from: call.source.clone(),
                    to: call.target.clone(),
                    timestamp: call.start_time,
                    duration: call.duration(),
                    arrow,
                    operation: call.operation.clone(),
                    inputs: call.inputs.clone(),
                    comment: None,
                });
            }
            EventKind::End => {
                let synchronous = i
                    .checked_sub(1)
                    .and_then(|prev| events.get(prev))
                    .is_some_and(|prev| prev.is(EventKind::Start, call.call_id));

                if synchronous && call.is_self_call() {
                    continue;
                }

                let (arrow, comment) = if synchronous {
                    (
                        ArrowKind::SyncReturn,
                        format!("{} -> {}", call.operation, call.outcome.description()),
                    )
                } else {
                    (ArrowKind::AsyncClose, call.outcome.description())
                };

                messages.push(Message {
                    call_id: call.call_id,
                    sequence_key: return_key(call),
                    from: call.target.clone(),
                    to: call.source.clone(),
                    // End events only exist for finished calls
                    timestamp: call.end_time().unwrap_or(call.start_time),
                    duration: call.duration(),
                    arrow,
                    operation: call.operation.clone(),
                    inputs: call.inputs.clone(),
                    comment: Some(comment),
                });
            }
        }
    }

    debug!(
        message_count = messages.len(),
        elided, "Messages synthesized"
    );
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CallDuration, Container};

    fn sys(system: &str, label: &str) -> Container {
        Container::system(system, label)
    }

    #[test]
    fn test_empty_input() {
        assert!(synthesize(&[]).is_empty());
    }

    #[test]
    fn test_synchronous_self_call_is_elided() {
        let x = sys("Sys1", "X");
        let calls = vec![CallRecord::new(1, x.clone(), x, "tick", 0).completed(2, 5, "done")];
        assert!(synthesize(&calls).is_empty());
    }

    #[test]
    fn test_interleaved_call_is_async() {
        let x = sys("Sys1", "X");
        let y = sys("Sys2", "Y");
        let z = sys("Sys3", "Z");
        let calls = vec![
            CallRecord::new(1, x.clone(), y.clone(), "a", 0).completed(4, 100, "A done"),
            CallRecord::new(2, y.clone(), z.clone(), "b", 10).completed(3, 50, "B done"),
        ];

        let messages = synthesize(&calls);
        let arrows: Vec<_> = messages.iter().map(|m| (m.call_id, m.arrow)).collect();
        assert_eq!(
            arrows,
            vec![
                (1, ArrowKind::AsyncOpen),
                (2, ArrowKind::SyncCall),
                (2, ArrowKind::SyncReturn),
                (1, ArrowKind::AsyncClose),
            ]
        );

        assert_eq!(messages[2].from, z);
        assert_eq!(messages[2].to, y);
        assert_eq!(messages[2].comment.as_deref(), Some("b -> B done"));
        assert_eq!(messages[3].from, y);
        assert_eq!(messages[3].to, x);
        assert_eq!(messages[3].comment.as_deref(), Some("A done"));
        assert_eq!(messages[3].sequence_key, 4);
        assert_eq!(messages[3].timestamp, 100);
    }

    #[test]
    fn test_async_self_call_is_kept() {
        let x = sys("app", "worker");
        let db = Container::database("app", "db");
        let calls = vec![
            CallRecord::new(1, x.clone(), x.clone(), "batch", 0).completed(4, 30, "ok"),
            CallRecord::new(2, x.clone(), db, "write", 5).completed(3, 10, "ok"),
        ];

        let messages = synthesize(&calls);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].arrow, ArrowKind::SelfCall);
        assert_eq!(messages[3].arrow, ArrowKind::AsyncClose);
        assert_eq!(messages[3].comment.as_deref(), Some("ok"));
    }

    #[test]
    fn test_failed_sync_comment() {
        let a = sys("s", "a");
        let b = sys("s", "b");
        let calls = vec![CallRecord::new(1, a, b, "fetch", 0).failed(2, 9, "timeout")];
        let messages = synthesize(&calls);
        assert_eq!(messages[1].arrow, ArrowKind::SyncReturn);
        assert_eq!(
            messages[1].comment.as_deref(),
            Some("fetch -> Failed with 'timeout'")
        );
    }

    #[test]
    fn test_pending_call_yields_single_message() {
        let a = sys("s", "a");
        let b = sys("s", "b");
        let calls = vec![CallRecord::new(7, a, b, "wait", 0)];
        let messages = synthesize(&calls);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].call_id, 7);
        assert_eq!(messages[0].arrow, ArrowKind::AsyncOpen);
        assert_eq!(messages[0].duration, CallDuration::Infinite);
        assert!(messages[0].comment.is_none());
    }

    #[test]
    fn test_missing_response_id_sorts_returns_last() {
        let a = sys("s", "a");
        let b = sys("s", "b");
        let c = sys("s", "c");
        let mut first = CallRecord::new(1, a.clone(), b.clone(), "one", 0).completed(0, 5, "x");
        first.response_id = None;
        let second = CallRecord::new(2, b, c, "two", 10).completed(3, 20, "y");

        let messages = synthesize(&[first, second]);
        let keys: Vec<_> = messages.iter().map(|m| m.sequence_key).collect();
        assert_eq!(keys, vec![1, 2, 3, u64::MAX]);
        assert_eq!(messages[0].arrow, ArrowKind::AsyncOpen);
        assert_eq!(messages[3].arrow, ArrowKind::AsyncClose);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = sys("s", "a");
        let b = sys("s", "b");
        let c = sys("t", "c");
        let one = CallRecord::new(1, a.clone(), b.clone(), "one", 0).completed(2, 5, "x");
        let two = CallRecord::new(3, b, c, "two", 10).completed(4, 20, "y");

        let forward = synthesize(&[one.clone(), two.clone()]);
        let backward = synthesize(&[two, one]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_call_messages_carry_inputs_and_duration() {
        let a = sys("s", "a");
        let b = sys("s", "b");
        let calls = vec![CallRecord::new(1, a, b, "search", 100)
            .with_inputs(vec![serde_json::json!("rust")])
            .completed(2, 160, "hits")];
        let messages = synthesize(&calls);
        assert_eq!(messages[0].inputs, vec![serde_json::json!("rust")]);
        assert_eq!(messages[0].duration, CallDuration::Finite(60));
        assert_eq!(messages[0].timestamp, 100);
        assert_eq!(messages[1].timestamp, 160);
    }
}
