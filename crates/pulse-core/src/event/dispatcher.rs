// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The main dispatcher: a FIFO of deferred work drained on the owning thread.
//!
//! Platform callbacks and background threads never touch render or UI state
//! directly; they enqueue an [`AppCommand`] (or, for ad-hoc work, a [`Task`])
//! and the owning thread runs it on its next [`MainDispatcher::poll`].

use crate::platform::input::InputEvent;
use crate::platform::window::Size;
use crate::utils::panic::panic_message;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A deferred zero-argument callable.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A well-known piece of deferred work, kept as data so the queue stays
/// inspectable.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// The window was resized to the given physical size.
    Resize(Size),
    /// An input event arrived from the platform.
    Input(InputEvent),
    /// The user asked to close the window.
    Close,
    /// The graphics frame counter completed a measurement window.
    FpsReport(u32),
    /// The foreground framebuffer must follow the logical window size.
    UpdateForegroundFramebuffer(Size),
    /// Read the viewport back and save it to the given file.
    Screenshot(PathBuf),
}

impl AppCommand {
    /// The variant name, for diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            AppCommand::Resize(_) => "Resize",
            AppCommand::Input(_) => "Input",
            AppCommand::Close => "Close",
            AppCommand::FpsReport(_) => "FpsReport",
            AppCommand::UpdateForegroundFramebuffer(_) => "UpdateForegroundFramebuffer",
            AppCommand::Screenshot(_) => "Screenshot",
        }
    }
}

/// One entry of the dispatcher queue.
pub enum Dispatch {
    /// A command handled by the application's command handler.
    Command(AppCommand),
    /// An opaque callable.
    Task(Task),
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Command(command) => f.debug_tuple("Command").field(command).finish(),
            Dispatch::Task(_) => f.write_str("Task(..)"),
        }
    }
}

/// A cloneable sending end, for threads that do not own the dispatcher.
#[derive(Clone)]
pub struct DispatcherHandle {
    sender: flume::Sender<Dispatch>,
    open: Arc<AtomicBool>,
}

impl DispatcherHandle {
    /// Enqueues a callable.
    pub fn add_event<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.send(Dispatch::Task(Box::new(task)));
    }

    /// Enqueues a command.
    pub fn add_command(&self, command: AppCommand) {
        self.send(Dispatch::Command(command));
    }

    fn send(&self, entry: Dispatch) {
        if !self.open.load(Ordering::Acquire) {
            log::warn!("Main dispatcher is shut down, dropping {entry:?}.");
            return;
        }
        if let Err(e) = self.sender.send(entry) {
            log::error!("Failed to enqueue {:?}: receiver disconnected.", e.0);
        }
    }
}

impl fmt::Debug for DispatcherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherHandle")
            .field("open", &self.open.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// The owning thread's deferred-work queue.
///
/// Entries run in enqueue order. [`poll`](Self::poll) drains a snapshot of
/// the queue: anything enqueued while it runs lands in the *next* poll, which
/// keeps a self-re-enqueuing callable from starving the frame.
pub struct MainDispatcher {
    handle: DispatcherHandle,
    receiver: flume::Receiver<Dispatch>,
}

impl MainDispatcher {
    /// Creates an empty, open dispatcher.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("Main dispatcher initialized.");
        Self {
            handle: DispatcherHandle {
                sender,
                open: Arc::new(AtomicBool::new(true)),
            },
            receiver,
        }
    }

    /// Returns a cloneable sending end.
    pub fn handle(&self) -> DispatcherHandle {
        self.handle.clone()
    }

    /// Enqueues a callable.
    pub fn add_event<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.add_event(task);
    }

    /// Enqueues a command.
    pub fn add_command(&self, command: AppCommand) {
        self.handle.add_command(command);
    }

    /// Number of entries waiting for the next poll.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Returns `false` once [`shutdown`](Self::shutdown) has been called.
    pub fn is_open(&self) -> bool {
        self.handle.open.load(Ordering::Acquire)
    }

    /// Runs every entry that was queued when the call began.
    ///
    /// Commands are passed to `handler`; tasks are invoked directly. A panic in
    /// one entry is logged and the drain continues with the next one.
    /// Returns the number of entries run.
    pub fn poll(&self, handler: &mut dyn FnMut(AppCommand)) -> usize {
        let batch: Vec<Dispatch> = self.receiver.drain().collect();
        let count = batch.len();

        for entry in batch {
            let (label, outcome) = match entry {
                Dispatch::Task(task) => ("task", catch_unwind(AssertUnwindSafe(task))),
                Dispatch::Command(command) => (
                    command.name(),
                    catch_unwind(AssertUnwindSafe(|| handler(command))),
                ),
            };

            if let Err(payload) = outcome {
                log::error!(
                    "Main dispatcher {} panicked: {}",
                    label,
                    panic_message(payload.as_ref())
                );
            }
        }

        if count > 0 {
            log::trace!("Main dispatcher ran {count} entries.");
        }
        count
    }

    /// Closes the dispatcher and discards everything still queued.
    pub fn shutdown(&self) {
        self.handle.open.store(false, Ordering::Release);
        let discarded = self.receiver.drain().count();
        if discarded > 0 {
            log::warn!("Main dispatcher shut down with {discarded} pending entries.");
        } else {
            log::debug!("Main dispatcher shut down.");
        }
    }
}

impl Default for MainDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Task) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let for_tasks = log.clone();
        let make = move |value: u32| -> Task {
            let log = for_tasks.clone();
            Box::new(move || log.lock().unwrap().push(value))
        };
        (log, make)
    }

    #[test]
    fn poll_runs_tasks_once_in_fifo_order() {
        let dispatcher = MainDispatcher::new();
        let (log, make) = recorder();

        for value in 0..5 {
            let task = make(value);
            dispatcher.add_event(task);
        }
        assert_eq!(dispatcher.pending(), 5);

        assert_eq!(dispatcher.poll(&mut |_| {}), 5);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);

        assert_eq!(dispatcher.poll(&mut |_| {}), 0);
        assert_eq!(log.lock().unwrap().len(), 5);
    }

    #[test]
    fn nested_enqueue_runs_on_the_next_poll() {
        let dispatcher = MainDispatcher::new();
        let (log, make) = recorder();
        let handle = dispatcher.handle();

        let inner = make(2);
        let outer_log = log.clone();
        dispatcher.add_event(move || {
            outer_log.lock().unwrap().push(1);
            handle.add_event(inner);
        });

        dispatcher.poll(&mut |_| {});
        assert_eq!(*log.lock().unwrap(), vec![1]);
        assert_eq!(dispatcher.pending(), 1);

        dispatcher.poll(&mut |_| {});
        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn commands_reach_the_handler_interleaved_with_tasks() {
        let dispatcher = MainDispatcher::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let task_order = order.clone();
        dispatcher.add_command(AppCommand::Resize(Size::new(10, 20)));
        dispatcher.add_event(move || task_order.lock().unwrap().push("task".to_string()));
        dispatcher.add_command(AppCommand::Close);

        let handler_order = order.clone();
        dispatcher.poll(&mut |command| {
            handler_order.lock().unwrap().push(format!("{command:?}"));
        });

        assert_eq!(
            *order.lock().unwrap(),
            vec![
                "Resize(Size { width: 10, height: 20 })".to_string(),
                "task".to_string(),
                "Close".to_string()
            ]
        );
    }

    #[test]
    fn a_panicking_entry_does_not_abort_the_drain() {
        let dispatcher = MainDispatcher::new();
        let (log, make) = recorder();

        dispatcher.add_event(make(1));
        dispatcher.add_event(|| panic!("callable failure"));
        dispatcher.add_command(AppCommand::Close);
        dispatcher.add_event(make(3));

        let ran = dispatcher.poll(&mut |_| panic!("handler failure"));
        assert_eq!(ran, 4);
        assert_eq!(*log.lock().unwrap(), vec![1, 3]);
    }

    #[test]
    fn a_panicking_command_does_not_skip_later_commands() {
        let dispatcher = MainDispatcher::new();
        dispatcher.add_command(AppCommand::FpsReport(30));
        dispatcher.add_command(AppCommand::Close);

        let mut seen = Vec::new();
        let ran = dispatcher.poll(&mut |command: AppCommand| {
            if let AppCommand::FpsReport(_) = command {
                panic!("report failure");
            }
            seen.push(command.name());
        });

        assert_eq!(ran, 2);
        assert_eq!(seen, vec!["Close"]);
    }

    #[test]
    fn command_names_skip_payloads() {
        assert_eq!(AppCommand::Resize(Size::new(1, 1)).name(), "Resize");
        assert_eq!(
            AppCommand::Screenshot(PathBuf::from("a.png")).name(),
            "Screenshot"
        );
    }

    #[test]
    fn handles_enqueue_from_other_threads() {
        let dispatcher = MainDispatcher::new();
        let handle = dispatcher.handle();

        let producer = thread::spawn(move || {
            for fps in 0..10 {
                handle.add_command(AppCommand::FpsReport(fps));
            }
        });
        producer.join().expect("producer thread panicked");

        let mut seen = Vec::new();
        dispatcher.poll(&mut |command| {
            if let AppCommand::FpsReport(fps) = command {
                seen.push(fps);
            }
        });
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn shutdown_discards_pending_and_rejects_new_entries() {
        let dispatcher = MainDispatcher::new();
        let (log, make) = recorder();

        dispatcher.add_event(make(1));
        dispatcher.shutdown();
        assert!(!dispatcher.is_open());
        assert!(dispatcher.is_empty());

        dispatcher.add_event(make(2));
        assert_eq!(dispatcher.poll(&mut |_| {}), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn dispatch_debug_hides_task_bodies() {
        let task = Dispatch::Task(Box::new(|| {}));
        assert_eq!(format!("{task:?}"), "Task(..)");
        let command = Dispatch::Command(AppCommand::FpsReport(60));
        assert_eq!(format!("{command:?}"), "Command(FpsReport(60))");
    }
}
