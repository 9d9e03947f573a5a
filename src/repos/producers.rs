//! Producers repo, presents CRUD operations with db for producers
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;
use failure::Fail;

use errors::Error;
use models::{NewProducer, Ordering, Producer, UpdateProducer};
use repos::error::constraint_error;
use repos::types::RepoResult;
use schema::producers::dsl::*;

/// Producers repository, responsible for handling producers
pub struct ProducersRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
}

pub trait ProducersRepo {
    /// Find specific producer by id
    fn find(&self, id_arg: i32) -> RepoResult<Option<Producer>>;

    /// Returns all producers in storage order
    fn list(&self) -> RepoResult<Vec<Producer>>;

    /// Returns all producers ordered by name
    fn list_sorted(&self, ordering: Ordering) -> RepoResult<Vec<Producer>>;

    /// Creates new producer
    fn create(&self, payload: NewProducer) -> RepoResult<Producer>;

    /// Updates specific producer, returns `false` if nothing was updated
    fn update(&self, id_arg: i32, payload: UpdateProducer) -> RepoResult<bool>;

    /// Deletes specific producer, returns `false` if nothing was deleted
    fn delete(&self, id_arg: i32) -> RepoResult<bool>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ProducersRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T) -> Self {
        Self { db_conn }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ProducersRepo for ProducersRepoImpl<'a, T> {
    fn find(&self, id_arg: i32) -> RepoResult<Option<Producer>> {
        debug!("Find in producers with id {}.", id_arg);
        producers
            .find(id_arg)
            .get_result::<Producer>(self.db_conn)
            .optional()
            .map_err(|e| e.context(format!("Find producer with id {} error occurred.", id_arg)).into())
    }

    fn list(&self) -> RepoResult<Vec<Producer>> {
        debug!("Find all producers.");
        producers
            .get_results::<Producer>(self.db_conn)
            .map_err(|e| e.context("Find all producers error occurred.").into())
    }

    fn list_sorted(&self, ordering: Ordering) -> RepoResult<Vec<Producer>> {
        debug!("Find all producers ordered {:?} by name.", ordering);
        let query = producers.into_boxed();
        let query = match ordering {
            Ordering::Ascending => query.order(name.asc()),
            Ordering::Descending => query.order(name.desc()),
        };
        query
            .get_results::<Producer>(self.db_conn)
            .map_err(|e| e.context(format!("Find producers ordered {:?} error occurred.", ordering)).into())
    }

    fn create(&self, payload: NewProducer) -> RepoResult<Producer> {
        debug!("Create producer {:?}.", payload);
        diesel::insert_into(producers)
            .values(&payload)
            .get_result::<Producer>(self.db_conn)
            .map_err(|e| constraint_error(e, Error::DuplicateName, Error::ReferentialConflict))
            .map_err(|e: FailureError| e.context(format!("Create producer {:?} error occurred.", payload)).into())
    }

    fn update(&self, id_arg: i32, payload: UpdateProducer) -> RepoResult<bool> {
        debug!("Updating producer with id {} and payload {:?}.", id_arg, payload);
        let filter = producers.filter(id.eq(id_arg));
        diesel::update(filter)
            .set(name.eq(&payload.name))
            .execute(self.db_conn)
            .map(|count| count > 0)
            .map_err(|e| constraint_error(e, Error::DuplicateName, Error::ReferentialConflict))
            .map_err(|e: FailureError| e.context(format!("Update producer {} with {:?} error occurred.", id_arg, payload)).into())
    }

    fn delete(&self, id_arg: i32) -> RepoResult<bool> {
        debug!("Delete producer with id {}.", id_arg);
        let filter = producers.filter(id.eq(id_arg));
        diesel::delete(filter)
            .execute(self.db_conn)
            .map(|count| count > 0)
            .map_err(|e| constraint_error(e, Error::DuplicateName, Error::ReferentialConflict))
            .map_err(|e: FailureError| e.context(format!("Delete producer with id {} error occurred.", id_arg)).into())
    }
}
