use std::any::Any;

use diesel::SqliteConnection;
use tokio::sync::{mpsc, oneshot};

use papertrade_core::db::{DbTransactionExecutor, TxError};
use papertrade_core::errors::Result;

use super::DbPool;

const WRITE_QUEUE_DEPTH: usize = 1024;

type ErasedResult = Result<Box<dyn Any + Send>>;

struct Envelope {
    job: Box<dyn FnOnce(&mut SqliteConnection) -> ErasedResult + Send>,
    reply: oneshot::Sender<ErasedResult>,
}

/// Handle for sending jobs to the writer actor.
///
/// Every job runs as one immediate transaction on the actor's dedicated
/// connection, so writes are serialized application-wide. A job's error
/// rolls its transaction back and comes back to the caller unchanged.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<Envelope>,
}

impl WriteHandle {
    /// Runs `job` on the writer's connection and returns its result.
    ///
    /// Panics if the actor is gone, which only happens when the runtime
    /// itself is tearing down.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply, rx) = oneshot::channel();
        let envelope = Envelope {
            job: Box::new(move |conn| job(conn).map(|v| Box::new(v) as Box<dyn Any + Send>)),
            reply,
        };

        self.tx
            .send(envelope)
            .await
            .expect("write actor stopped while handles are still alive");

        let erased = rx.await.expect("write actor dropped a reply channel")?;
        Ok(*erased
            .downcast::<T>()
            .unwrap_or_else(|_| panic!("write job reply had an unexpected type")))
    }
}

#[async_trait::async_trait]
impl DbTransactionExecutor for WriteHandle {
    async fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.exec(f).await
    }
}

/// Spawns the single-writer task. The actor checks one connection out
/// of the pool for its whole lifetime and works through queued jobs in
/// arrival order, each inside its own immediate transaction.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<Envelope>(WRITE_QUEUE_DEPTH);

    tokio::spawn(async move {
        let mut conn = pool
            .get()
            .expect("no pooled connection available for the write actor");

        while let Some(Envelope { job, reply }) = rx.recv().await {
            // TxError carries the job's typed error through Diesel's
            // rollback machinery instead of flattening it to a string.
            let outcome = conn
                .immediate_transaction::<_, TxError, _>(|c| job(c).map_err(TxError::Domain))
                .map_err(TxError::into_error);

            // A closed reply channel means the caller gave up waiting;
            // the transaction outcome stands either way.
            let _ = reply.send(outcome);
        }
        // recv() returning None means every WriteHandle was dropped.
    });

    WriteHandle { tx }
}
