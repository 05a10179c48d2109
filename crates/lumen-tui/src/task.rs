//! Deferred work.
//!
//! `update` never performs side effects itself. It returns a [`Task`]
//! describing work for the event loop, and each unit of work delivers exactly
//! one [`Event`] back when it completes.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc::UnboundedSender;

use lumen_core::LumenError;

use crate::event::Event;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

enum Inner {
    None,
    Quit,
    Future(BoxFuture<Event>),
    Batch(Vec<Task>),
}

/// Work returned from `init` and `update`.
pub struct Task(Inner);

impl Task {
    pub fn none() -> Self {
        Task(Inner::None)
    }

    /// Deliver `event` on the next loop iteration.
    pub fn done(event: Event) -> Self {
        Self::perform(async move { event })
    }

    pub fn perform<F>(future: F) -> Self
    where
        F: Future<Output = Event> + Send + 'static,
    {
        Task(Inner::Future(Box::pin(future)))
    }

    /// Run `work` on the blocking thread pool.
    pub fn blocking<F>(work: F) -> Self
    where
        F: FnOnce() -> Event + Send + 'static,
    {
        Self::perform(async move {
            tokio::task::spawn_blocking(work)
                .await
                .unwrap_or_else(|e| Event::Error(LumenError::Platform(e.to_string())))
        })
    }

    /// Stop the event loop.
    pub fn quit() -> Self {
        Task(Inner::Quit)
    }

    pub fn batch(tasks: impl IntoIterator<Item = Task>) -> Self {
        let tasks: Vec<Task> = tasks.into_iter().filter(|t| !t.is_none()).collect();
        if tasks.is_empty() {
            Task::none()
        } else {
            Task(Inner::Batch(tasks))
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self.0, Inner::None)
    }

    /// Whether this task, or any task of a batch, stops the loop.
    pub fn is_quit(&self) -> bool {
        match self.0 {
            Inner::Quit => true,
            Inner::Batch(ref tasks) => tasks.iter().any(Task::is_quit),
            _ => false,
        }
    }

    /// Spawn the work onto the current runtime, sending each resulting event
    /// to `sender`. Returns whether the loop should stop.
    pub fn spawn(self, sender: &UnboundedSender<Event>) -> bool {
        match self.0 {
            Inner::None => false,
            Inner::Quit => true,
            Inner::Future(future) => {
                let sender = sender.clone();
                tokio::spawn(async move {
                    let event = future.await;
                    tracing::trace!(event = event.name(), "task completed");
                    // The loop may already be gone.
                    let _ = sender.send(event);
                });
                false
            }
            Inner::Batch(tasks) => tasks
                .into_iter()
                .fold(false, |quit, task| task.spawn(sender) || quit),
        }
    }

    /// Run the work in place and return the produced events in order.
    pub fn collect(self) -> BoxFuture<Vec<Event>> {
        Box::pin(async move {
            match self.0 {
                Inner::None | Inner::Quit => Vec::new(),
                Inner::Future(future) => vec![future.await],
                Inner::Batch(tasks) => {
                    let mut events = Vec::new();
                    for task in tasks {
                        events.extend(task.collect().await);
                    }
                    events
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_flags() {
        assert!(Task::batch([Task::none(), Task::none()]).is_none());
        assert!(Task::batch([Task::done(Event::Pop), Task::quit()]).is_quit());
        assert!(!Task::done(Event::Pop).is_quit());
    }

    #[tokio::test]
    async fn test_collect_runs_in_order() {
        let task = Task::batch([
            Task::done(Event::Print("a".into())),
            Task::blocking(|| Event::Print("b".into())),
        ]);

        let printed: Vec<String> = task
            .collect()
            .await
            .into_iter()
            .filter_map(|event| match event {
                Event::Print(text) => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(printed, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_spawn_delivers_events() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let quit = Task::batch([Task::done(Event::Pop), Task::none()]).spawn(&tx);

        assert!(!quit);
        assert!(matches!(rx.recv().await, Some(Event::Pop)));
        assert!(Task::quit().spawn(&tx));
    }
}
