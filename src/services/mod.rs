//! Services is a core layer for the app business logic like
//! validation and tree invariants

pub mod categories;
pub mod goods;
pub mod producers;
pub mod types;

pub use self::categories::*;
pub use self::goods::*;
pub use self::producers::*;
pub use self::types::*;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use failure::Fail;
use futures::future;
use r2d2::{ManageConnection, PooledConnection};
use validator::Validate;

use controller::context::StaticContext;
use errors::Error;
use repos::repo_factory::*;

/// Service
pub struct Service<
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
> {
    pub static_context: StaticContext<T, M, F>,
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > Service<T, M, F>
{
    /// Create a new service
    pub fn new(static_context: StaticContext<T, M, F>) -> Self {
        Self { static_context }
    }

    /// Runs `f` on the cpu pool with a connection checked out of the db pool.
    /// The connection goes back to the pool when `f` returns.
    pub fn spawn_on_pool<R, Func>(&self, f: Func) -> ServiceFuture<R>
    where
        Func: FnOnce(PooledConnection<M>) -> Result<R, FailureError> + Send + 'static,
        R: Send + 'static,
    {
        let db_pool = self.static_context.db_pool.clone();
        let cpu_pool = self.static_context.cpu_pool.clone();
        Box::new(cpu_pool.spawn_fn(move || {
            db_pool
                .get()
                .map_err(|e| e.context(Error::Connection).into())
                .and_then(f)
        }))
    }
}

/// Runs field validation of a payload, failures carry `Error::Validate`
pub fn validate_payload<V: Validate>(payload: &V) -> Result<(), FailureError> {
    payload
        .validate()
        .map_err(|e| format_err!("Payload validation failed").context(Error::Validate(e)).into())
}

/// Resolves to the error right away, used when a request fails before
/// reaching the db pool
pub fn reject<R: 'static>(err: FailureError) -> ServiceFuture<R> {
    Box::new(future::err(err))
}
