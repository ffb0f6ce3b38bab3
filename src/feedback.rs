//! The mutation-feedback protocol.
//!
//! Every remote mutation runs through [`perform_mutation`], which owns
//! exactly one toast lifecycle: a pending toast is pushed before the call,
//! then updated exactly once to a terminal style when the call settles. All
//! errors from the remote call are caught at this boundary and surfaced as a
//! failure toast; none propagate to the caller.

use std::fmt;
use std::future::Future;

use log::error;

/// Handle to a pushed toast, valid for the sink that issued it.
pub type ToastId = u64;

/// Visual style of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStyle {
    Pending,
    Success,
    Failure,
}

/// A transient status indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub style: ToastStyle,
    pub title: String,
    pub message: Option<String>,
}

impl Toast {
    /// A pending toast with the given title.
    pub fn pending(title: impl Into<String>) -> Self {
        Toast {
            style: ToastStyle::Pending,
            title: title.into(),
            message: None,
        }
    }

    /// Apply an update in place.
    pub fn apply(&mut self, update: ToastUpdate) {
        if let Some(style) = update.style {
            self.style = style;
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if update.message.is_some() {
            self.message = update.message;
        }
    }
}

/// Partial update to an already-pushed toast.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastUpdate {
    pub style: Option<ToastStyle>,
    pub title: Option<String>,
    pub message: Option<String>,
}

impl ToastUpdate {
    /// Terminal success update.
    pub fn success(title: impl Into<String>) -> Self {
        ToastUpdate {
            style: Some(ToastStyle::Success),
            title: Some(title.into()),
            message: None,
        }
    }

    /// Terminal failure update carrying the error description.
    pub fn failure(title: impl Into<String>, message: Option<String>) -> Self {
        ToastUpdate {
            style: Some(ToastStyle::Failure),
            title: Some(title.into()),
            message,
        }
    }
}

/// Where toasts go: the TUI renders them, the CLI prints them, tests record
/// them.
pub trait ToastSink {
    fn push(&self, toast: Toast) -> ToastId;
    fn update(&self, id: ToastId, update: ToastUpdate);
}

/// The three human-readable titles of one mutation's feedback.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackLabels {
    pub pending: String,
    pub success: String,
    pub failure: String,
}

impl FeedbackLabels {
    pub fn new(
        pending: impl Into<String>,
        success: impl Into<String>,
        failure: impl Into<String>,
    ) -> Self {
        FeedbackLabels {
            pending: pending.into(),
            success: success.into(),
            failure: failure.into(),
        }
    }
}

/// Terminal result of one mutation invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Succeeded,
    Failed,
}

/// Execute one remote mutation and keep the user informed of its outcome.
///
/// `op` is the mutation call, already parameterized with its payload.
/// `revalidate` is invoked exactly once, synchronously after the success
/// transition, and never on failure; callers supply it only when a detail
/// view needs a re-fetch.
///
/// Overlapping invocations are not deduplicated: each runs to completion
/// independently and their completions race, the server keeping whichever
/// write lands last.
pub async fn perform_mutation<T, E, F, R>(
    toasts: &impl ToastSink,
    labels: &FeedbackLabels,
    op: F,
    revalidate: Option<R>,
) -> MutationOutcome
where
    F: Future<Output = Result<T, E>>,
    E: fmt::Display,
    R: FnOnce(),
{
    let toast_id = toasts.push(Toast::pending(&labels.pending));

    match op.await {
        Ok(_) => {
            toasts.update(toast_id, ToastUpdate::success(&labels.success));
            if let Some(revalidate) = revalidate {
                revalidate();
            }
            MutationOutcome::Succeeded
        }
        Err(err) => {
            error!("mutation failed: {err}");
            toasts.update(toast_id, ToastUpdate::failure(&labels.failure, Some(err.to_string())));
            MutationOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, PartialEq)]
    enum Event {
        Push(Toast),
        Update(ToastId, ToastUpdate),
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<Event>>,
    }

    impl ToastSink for RecordingSink {
        fn push(&self, toast: Toast) -> ToastId {
            let mut events = self.events.lock().unwrap();
            let id = events.len() as ToastId;
            events.push(Event::Push(toast));
            id
        }

        fn update(&self, id: ToastId, update: ToastUpdate) {
            self.events.lock().unwrap().push(Event::Update(id, update));
        }
    }

    fn labels() -> FeedbackLabels {
        FeedbackLabels::new("Setting status", "Set status", "Failed to set status")
    }

    #[tokio::test]
    async fn test_success_transitions_pending_then_success() {
        let sink = RecordingSink::default();
        let outcome =
            perform_mutation(&sink, &labels(), async { Ok::<_, anyhow::Error>(()) }, None::<fn()>)
                .await;

        assert_eq!(outcome, MutationOutcome::Succeeded);
        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::Push(Toast::pending("Setting status")));
        assert_eq!(events[1], Event::Update(0, ToastUpdate::success("Set status")));
    }

    #[tokio::test]
    async fn test_failure_surfaces_the_error_description() {
        let sink = RecordingSink::default();
        let outcome = perform_mutation(
            &sink,
            &labels(),
            async { Err::<(), _>(anyhow::anyhow!("422 Unprocessable Entity")) },
            None::<fn()>,
        )
        .await;

        assert_eq!(outcome, MutationOutcome::Failed);
        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            Event::Update(
                0,
                ToastUpdate::failure(
                    "Failed to set status",
                    Some("422 Unprocessable Entity".to_string())
                )
            )
        );
    }

    #[tokio::test]
    async fn test_revalidate_runs_once_after_success() {
        let sink = RecordingSink::default();
        let calls = AtomicUsize::new(0);
        perform_mutation(
            &sink,
            &labels(),
            async { Ok::<_, anyhow::Error>(()) },
            Some(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                // The success transition must already be recorded.
                assert_eq!(sink.events.lock().unwrap().len(), 2);
            }),
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_revalidate_never_runs_on_failure() {
        let sink = RecordingSink::default();
        let calls = AtomicUsize::new(0);
        perform_mutation(
            &sink,
            &labels(),
            async { Err::<(), _>(anyhow::anyhow!("boom")) },
            Some(|| {
                calls.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exactly_one_terminal_transition_per_invocation() {
        let sink = RecordingSink::default();
        perform_mutation(&sink, &labels(), async { Ok::<_, anyhow::Error>(()) }, None::<fn()>)
            .await;
        let events = sink.events.lock().unwrap();
        let terminals = events
            .iter()
            .filter(|e| matches!(e, Event::Update(_, u) if u.style.is_some()))
            .count();
        assert_eq!(terminals, 1);
    }
}
