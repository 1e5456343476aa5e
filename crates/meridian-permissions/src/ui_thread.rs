//! Deferred delivery onto the owning thread
//!
//! Asynchronous permission queries compute their answer immediately and hand
//! the callback to a [`UiThread`]. The thread that owns the stores drives the
//! matching [`UiThreadLoop`], so callbacks never run concurrently with store
//! mutations.

use tokio::sync::mpsc;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Cloneable handle for posting tasks to the owning thread.
#[derive(Clone)]
pub struct UiThread {
    tx: mpsc::UnboundedSender<Task>,
}

/// Receiving end, driven by the owning thread.
pub struct UiThreadLoop {
    rx: mpsc::UnboundedReceiver<Task>,
}

impl UiThread {
    pub fn channel() -> (UiThread, UiThreadLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        (UiThread { tx }, UiThreadLoop { rx })
    }

    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.tx.send(Box::new(task)).is_err() {
            tracing::warn!("UI thread loop has shut down, dropping posted task");
        }
    }
}

impl UiThreadLoop {
    /// Run every task queued so far, returning how many ran.
    pub fn run_until_idle(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Run tasks as they arrive until every [`UiThread`] handle is dropped.
    pub async fn run(mut self) {
        while let Some(task) = self.rx.recv().await {
            task();
        }
        tracing::debug!("UI thread loop finished");
    }
}
