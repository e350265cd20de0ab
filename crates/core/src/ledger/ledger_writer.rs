use log::{debug, error};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use super::ledger_model::Ledger;
use super::ledger_traits::LedgerStoreTrait;
use crate::errors::{Error, Result};

type ErasedValue = Box<dyn Any + Send + 'static>;

// A job receives the freshly loaded ledger. Its return type is erased so one
// channel can carry jobs of every operation.
type Job = Box<dyn FnOnce(&mut Ledger) -> Result<ErasedValue> + Send + 'static>;

/// Handle to the single writer of a ledger store.
///
/// Every load -> mutate -> save cycle runs on one background task, one job at
/// a time, so concurrent operations on any accounts serialize and no update
/// is lost. Reads do not go through the writer.
#[derive(Clone)]
pub struct LedgerWriter {
    tx: mpsc::Sender<(Job, oneshot::Sender<Result<ErasedValue>>)>,
}

impl LedgerWriter {
    /// Spawns the writer task for `store`. Must be called within a Tokio runtime.
    pub fn spawn(store: Arc<dyn LedgerStoreTrait>) -> Self {
        // Bounded queue; senders wait when 1024 jobs are pending.
        let (tx, mut rx) = mpsc::channel::<(Job, oneshot::Sender<Result<ErasedValue>>)>(1024);

        tokio::spawn(async move {
            while let Some((job, reply_tx)) = rx.recv().await {
                let result = run_job(store.as_ref(), job);
                // The caller may have gone away; nothing to do then.
                let _ = reply_tx.send(result);
            }
            debug!("Ledger writer stopped: all handles dropped");
        });

        Self { tx }
    }

    /// Runs `job` against the current ledger and saves the ledger when it succeeds.
    ///
    /// When the job fails, the loaded ledger is discarded and nothing is written.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut Ledger) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        let erased: Job =
            Box::new(move |ledger| job(ledger).map(|value| Box::new(value) as ErasedValue));

        self.tx
            .send((erased, ret_tx))
            .await
            .map_err(|_| Error::Unexpected("Ledger writer is not running".to_string()))?;

        let boxed = ret_rx.await.map_err(|_| {
            Error::Unexpected("Ledger writer dropped the reply without a result".to_string())
        })??;

        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| Error::Unexpected("Ledger writer returned an unexpected type".to_string()))
    }
}

// A panicking job must not take the writer task down with it. The ledger it
// was mutating is dropped unsaved.
fn run_job(store: &dyn LedgerStoreTrait, job: Job) -> Result<ErasedValue> {
    panic::catch_unwind(AssertUnwindSafe(|| apply_job(store, job))).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        error!("Ledger write job panicked, nothing was saved: {}", reason);
        Err(Error::Unexpected(format!("Ledger write failed: {}", reason)))
    })
}

fn apply_job(store: &dyn LedgerStoreTrait, job: Job) -> Result<ErasedValue> {
    let mut ledger = store.load()?;
    let value = job(&mut ledger)?;
    store.save(&ledger)?;
    Ok(value)
}
