//! `StaticContext` holds everything a request handler needs that outlives the request
use std::marker::PhantomData;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use futures_cpupool::CpuPool;
use r2d2::{ManageConnection, Pool};

use repos::repo_factory::*;

/// Static context for all app
pub struct StaticContext<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    pub db_pool: Pool<M>,
    pub cpu_pool: CpuPool,
    pub repo_factory: F,
    phantom: PhantomData<T>,
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > StaticContext<T, M, F>
{
    /// Create a new static context
    pub fn new(db_pool: Pool<M>, cpu_pool: CpuPool, repo_factory: F) -> Self {
        Self {
            db_pool,
            cpu_pool,
            repo_factory,
            phantom: PhantomData,
        }
    }
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > Clone for StaticContext<T, M, F>
{
    fn clone(&self) -> Self {
        Self {
            db_pool: self.db_pool.clone(),
            cpu_pool: self.cpu_pool.clone(),
            repo_factory: self.repo_factory.clone(),
            phantom: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_cpupool::CpuPool;
    use r2d2;

    use super::*;
    use repos::repo_factory::tests::*;

    #[test]
    fn cloned_context_shares_storage() {
        let factory = ReposFactoryMock::with_root("Goods");
        let db_pool = r2d2::Pool::builder()
            .build(MockConnectionManager::default())
            .expect("Failed to create connection pool");
        let context = StaticContext::new(db_pool, CpuPool::new(1), factory);
        let cloned = context.clone();
        assert!(cloned.db_pool.get().is_ok());
        cloned.repo_factory.storage.lock().unwrap().categories.clear();
        assert!(context.repo_factory.storage.lock().unwrap().categories.is_empty());
    }
}
