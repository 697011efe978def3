// curvegraph/dispatch/src/edt.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The event dispatch thread (EDT).
//!
//! Every window-state mutation and all native event pumping happen on one dedicated thread per
//! display connection. Other threads hand it tasks through a channel, either fire-and-forget
//! or blocking until the task has run.
//!
//! Each iteration of the loop pumps native events without blocking, then runs at most one
//! queued task, waiting up to the configured granularity for it. Running one task per
//! iteration bounds the latency tasks add to event dispatch.

use crossbeam_channel::{self, Receiver, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

/// Native event source polled by the EDT.
pub trait EventPump: Send + 'static {
    /// Dispatches whatever native events are pending. Must not block.
    fn pump_events(&mut self);
}

/// A pump for threads that only run tasks.
pub struct NoEvents;

impl EventPump for NoEvents {
    #[inline]
    fn pump_events(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdtOptions {
    /// How long an idle iteration waits for a task before pumping events again.
    pub granularity_ms: u64,
}

impl Default for EdtOptions {
    #[inline]
    fn default() -> EdtOptions {
        EdtOptions { granularity_ms: 10 }
    }
}

impl EdtOptions {
    pub fn from_json(json: &str) -> Result<EdtOptions, serde_json::Error> {
        let mut options: EdtOptions = serde_json::from_str(json)?;
        if options.granularity_ms == 0 {
            warn!("EDT granularity of 0 ms would spin; using 1 ms");
            options.granularity_ms = 1;
        }
        Ok(options)
    }

    #[inline]
    pub fn granularity(&self) -> Duration {
        Duration::from_millis(self.granularity_ms.max(1))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EdtError {
    /// The EDT has been asked to stop and takes no more tasks.
    Stopped,
    /// The final task was not the last one processed. Fatal.
    TaskOrdering { pending: usize },
    /// The EDT went away before the task ran.
    Terminated,
    /// A task panicked.
    Panicked(String),
    /// `stop()` was called on the EDT itself, which would wait for its own exit.
    StopFromEdt,
    /// The worker thread couldn't be created.
    Spawn(String),
}

impl Display for EdtError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            EdtError::Stopped => write!(formatter, "event dispatch thread is stopped"),
            EdtError::TaskOrdering { pending } => {
                write!(formatter,
                       "final EDT task was followed by {} more task(s)",
                       pending)
            }
            EdtError::Terminated => write!(formatter, "event dispatch thread terminated"),
            EdtError::Panicked(ref message) => write!(formatter, "EDT task panicked: {}", message),
            EdtError::StopFromEdt => {
                write!(formatter, "the event dispatch thread cannot stop itself synchronously")
            }
            EdtError::Spawn(ref message) => {
                write!(formatter, "failed to spawn event dispatch thread: {}", message)
            }
        }
    }
}

impl Error for EdtError {}

type Job = Box<dyn FnOnce() + Send>;

struct Task {
    job: Job,
    is_final: bool,
    done: Option<Sender<Result<(), String>>>,
}

impl Task {
    fn run(self) {
        let result = panic::catch_unwind(AssertUnwindSafe(self.job)).map_err(panic_message);
        match self.done {
            Some(done) => drop(done.send(result)),
            None => {
                if let Err(message) = result {
                    error!("fire-and-forget EDT task panicked: {}", message);
                }
            }
        }
    }
}

pub struct EventDispatchThread {
    name: String,
    thread_id: ThreadId,
    // `None` once the final task has been queued.
    sender: Mutex<Option<Sender<Task>>>,
    worker: Mutex<Option<JoinHandle<Result<(), EdtError>>>>,
}

impl EventDispatchThread {
    pub fn start<P>(name: &str, pump: P, options: EdtOptions)
                    -> Result<EventDispatchThread, EdtError>
                    where P: EventPump {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let granularity = options.granularity();
        let worker = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || edt_loop(pump, receiver, granularity))
            .map_err(|error| EdtError::Spawn(error.to_string()))?;
        debug!("started event dispatch thread {:?}", name);
        Ok(EventDispatchThread {
            name: name.to_owned(),
            thread_id: worker.thread().id(),
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the calling thread is this EDT.
    #[inline]
    pub fn is_edt(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    pub fn is_running(&self) -> bool {
        lock(&self.sender).is_some()
    }

    /// Runs `task` on the EDT. With `wait`, blocks until it has run and reports its panic, if
    /// any. Called on the EDT itself, runs the task immediately.
    pub fn invoke<F>(&self, wait: bool, task: F) -> Result<(), EdtError>
                     where F: FnOnce() + Send + 'static {
        if self.is_edt() {
            task();
            return Ok(());
        }

        let (done_sender, done_receiver) = if wait {
            let (sender, receiver) = crossbeam_channel::bounded(1);
            (Some(sender), Some(receiver))
        } else {
            (None, None)
        };
        self.enqueue(Task { job: Box::new(task), is_final: false, done: done_sender })?;

        match done_receiver {
            None => Ok(()),
            Some(receiver) => match receiver.recv() {
                Ok(Ok(())) => Ok(()),
                Ok(Err(message)) => Err(EdtError::Panicked(message)),
                Err(_) => Err(EdtError::Terminated),
            },
        }
    }

    /// Runs `f` on the EDT and returns its result.
    pub fn invoke_and_wait<F, R>(&self, f: F) -> Result<R, EdtError>
                                 where F: FnOnce() -> R + Send + 'static, R: Send + 'static {
        if self.is_edt() {
            return Ok(f());
        }
        let (sender, receiver) = crossbeam_channel::bounded(1);
        self.invoke(true, move || drop(sender.send(f())))?;
        receiver.try_recv().map_err(|_| EdtError::Terminated)
    }

    /// Stops the EDT after every task queued so far has run, then waits for it to exit.
    #[inline]
    pub fn stop(&self) -> Result<(), EdtError> {
        self.stop_with(|| ())
    }

    /// Like `stop()`, running `final_task` as the last task on the EDT.
    pub fn stop_with<F>(&self, final_task: F) -> Result<(), EdtError>
                        where F: FnOnce() + Send + 'static {
        if self.is_edt() {
            return Err(EdtError::StopFromEdt);
        }

        {
            let mut sender = lock(&self.sender);
            match sender.take() {
                None => {
                    debug!("event dispatch thread {:?} already stopped", self.name);
                    return Ok(());
                }
                Some(sender) => {
                    let task = Task { job: Box::new(final_task), is_final: true, done: None };
                    if sender.send(task).is_err() {
                        warn!("event dispatch thread {:?} exited before its final task",
                              self.name);
                    }
                }
            }
        }

        let worker = lock(&self.worker).take();
        match worker {
            None => Ok(()),
            Some(worker) => match worker.join() {
                Ok(result) => {
                    debug!("event dispatch thread {:?} stopped", self.name);
                    result
                }
                Err(payload) => Err(EdtError::Panicked(panic_message(payload))),
            },
        }
    }

    fn enqueue(&self, task: Task) -> Result<(), EdtError> {
        let sender = lock(&self.sender);
        match *sender {
            None => Err(EdtError::Stopped),
            Some(ref sender) => sender.send(task).map_err(|_| EdtError::Terminated),
        }
    }
}

impl Drop for EventDispatchThread {
    fn drop(&mut self) {
        if !self.is_running() {
            return;
        }
        if let Err(error) = self.stop() {
            warn!("failed to stop event dispatch thread {:?}: {}", self.name, error);
        }
    }
}

fn edt_loop<P>(mut pump: P, receiver: Receiver<Task>, granularity: Duration)
               -> Result<(), EdtError>
               where P: EventPump {
    loop {
        pump.pump_events();

        let task = match receiver.recv_timeout(granularity) {
            Ok(task) => task,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                debug!("EDT task queue disconnected without a final task");
                return Ok(());
            }
        };

        let is_final = task.is_final;
        task.run();
        if is_final {
            let pending = receiver.try_iter().count();
            if pending > 0 {
                error!("final EDT task was followed by {} more task(s)", pending);
                return Err(EdtError::TaskOrdering { pending });
            }
            return Ok(());
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
