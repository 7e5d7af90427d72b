//! Background worker for out-of-band battle shouts.
//! This module exists so slow text generation never blocks a scheduler tick: requests are
//! fire-and-forget and results are drained once per frame.
//! It does not touch the grid or roster; prompts are built on the game thread.

use std::collections::VecDeque;
use std::mem;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::ShoutError;
use crate::types::EntityId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShoutRequest {
    pub entity: EntityId,
    pub prompt: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shout {
    pub entity: EntityId,
    pub text: String,
}

/// Black-box text source, typically a language model.
pub trait ShoutGenerator: Send + 'static {
    fn generate(&mut self, request: &ShoutRequest) -> Result<String, ShoutError>;
}

/// Offline generator that rotates through fixed lines.
pub struct TemplateShouts {
    lines: Vec<String>,
    next: usize,
}

impl TemplateShouts {
    pub fn new(lines: &[&str]) -> Self {
        Self { lines: lines.iter().map(|line| (*line).to_string()).collect(), next: 0 }
    }
}

impl Default for TemplateShouts {
    fn default() -> Self {
        Self::new(&["For the clan!", "You'll not leave this wood!", "Blood and bark!"])
    }
}

impl ShoutGenerator for TemplateShouts {
    fn generate(&mut self, request: &ShoutRequest) -> Result<String, ShoutError> {
        if self.lines.is_empty() {
            return Err(ShoutError::Generation(format!("no lines for `{}`", request.prompt)));
        }
        let line = self.lines[self.next % self.lines.len()].clone();
        self.next += 1;
        Ok(line)
    }
}

#[derive(Default)]
struct Queues {
    pending: VecDeque<ShoutRequest>,
    completed: Vec<Shout>,
    in_flight: usize,
    shutdown: bool,
}

struct Shared {
    queues: Mutex<Queues>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Queues> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct ShoutWorker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl ShoutWorker {
    pub fn spawn(generator: impl ShoutGenerator) -> Self {
        let shared = Arc::new(Shared { queues: Mutex::new(Queues::default()), wake: Condvar::new() });
        let worker_shared = Arc::clone(&shared);
        let handle = thread::spawn(move || run_worker(&worker_shared, generator));
        Self { shared, handle: Some(handle) }
    }

    pub fn request_shout(&self, entity: EntityId, prompt: String) {
        self.shared.lock().pending.push_back(ShoutRequest { entity, prompt });
        self.shared.wake.notify_all();
    }

    /// Takes every finished shout, oldest first.
    pub fn drain_completed(&self) -> Vec<Shout> {
        mem::take(&mut self.shared.lock().completed)
    }

    /// Blocks until nothing is pending or in flight, or until `timeout` passes.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut queues = self.shared.lock();
        while !queues.pending.is_empty() || queues.in_flight > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            queues = self
                .shared
                .wake
                .wait_timeout(queues, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }
}

impl Drop for ShoutWorker {
    fn drop(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.wake.notify_all();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("shout worker panicked");
        }
    }
}

fn run_worker(shared: &Shared, mut generator: impl ShoutGenerator) {
    loop {
        let request = {
            let mut queues = shared.lock();
            loop {
                if queues.shutdown {
                    return;
                }
                if let Some(request) = queues.pending.pop_front() {
                    queues.in_flight += 1;
                    break request;
                }
                queues = shared.wake.wait(queues).unwrap_or_else(PoisonError::into_inner);
            }
        };

        let result = generator.generate(&request);

        let mut queues = shared.lock();
        queues.in_flight -= 1;
        match result {
            Ok(text) => {
                debug!(entity = ?request.entity, "shout ready");
                queues.completed.push(Shout { entity: request.entity, text });
            }
            Err(err) => warn!(entity = ?request.entity, error = %err, "shout dropped"),
        }
        drop(queues);
        shared.wake.notify_all();
    }
}
