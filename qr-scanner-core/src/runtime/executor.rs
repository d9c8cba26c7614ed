use std::sync::mpsc;
use std::thread;

use parking_lot::Mutex;

use crate::models::error::ScannerError;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A named thread running submitted jobs one at a time, in submission order.
///
/// The scanner runs two of these: the background worker for session setup
/// and teardown, and the response context that handles commands, decode
/// events and result delivery.
pub struct SerialExecutor {
    name: String,
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
    thread_id: thread::ThreadId,
}

impl SerialExecutor {
    pub fn spawn(name: &str) -> Result<Self, ScannerError> {
        let (sender, receiver) = mpsc::channel::<Job>();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    job();
                }
            })
            .map_err(|e| {
                log::error!("failed to spawn {} thread: {}", name, e);
                ScannerError::UnexpectedError
            })?;

        Ok(Self {
            name: name.to_string(),
            thread_id: handle.thread().id(),
            sender: Mutex::new(Some(sender)),
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Queue `job`. Returns `false` (and drops the job) once shut down.
    pub fn execute<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(tx) => tx.send(Box::new(job)).is_ok(),
            None => {
                log::debug!("{} is shut down, dropping job", self.name);
                false
            }
        }
    }

    /// Queue `job`, or run it on the calling thread once shut down.
    ///
    /// For completions that must not be lost while the scanner drains.
    pub fn execute_or_run<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let rejected = {
            let sender = self.sender.lock();
            match sender.as_ref() {
                Some(tx) => tx.send(Box::new(job)).err().map(|e| e.0),
                None => Some(Box::new(job) as Job),
            }
        };
        if let Some(job) = rejected {
            log::debug!("{} is shut down, running job inline", self.name);
            job();
        }
    }

    /// Whether the calling thread is this executor's thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Stop accepting jobs, drain the queue and join the thread.
    ///
    /// Called from the executor's own thread it only closes the queue.
    pub fn shutdown(&self) {
        self.sender.lock().take();

        if self.is_current() {
            return;
        }
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                log::error!("{} thread panicked", self.name);
            }
        }
    }
}

impl Drop for SerialExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
