//! Goods repo, presents CRUD operations with db for goods
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;
use failure::Fail;

use errors::Error;
use models::{Goods, GoodsFilter, NewGoods, Ordering, UpdateGoods};
use repos::error::constraint_error;
use repos::types::RepoResult;
use schema::goods::dsl::*;
use schema::goods::BoxedQuery;

/// Goods repository, responsible for handling goods
pub struct GoodsRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
}

pub trait GoodsRepo {
    /// Find specific goods by id
    fn find(&self, id_arg: i32) -> RepoResult<Option<Goods>>;

    /// Returns all goods, newest first
    fn list(&self) -> RepoResult<Vec<Goods>>;

    /// Returns all goods ordered by name
    fn list_sorted(&self, ordering: Ordering) -> RepoResult<Vec<Goods>>;

    /// Returns goods matching the filter ordered by name
    fn list_by_filter(&self, filter: GoodsFilter) -> RepoResult<Vec<Goods>>;

    /// Creates new goods
    fn create(&self, payload: NewGoods) -> RepoResult<Goods>;

    /// Updates specific goods, returns `false` if nothing was updated
    fn update(&self, id_arg: i32, payload: UpdateGoods) -> RepoResult<bool>;

    /// Deletes specific goods, returns `false` if nothing was deleted
    fn delete(&self, id_arg: i32) -> RepoResult<bool>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> GoodsRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T) -> Self {
        Self { db_conn }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> GoodsRepo for GoodsRepoImpl<'a, T> {
    fn find(&self, id_arg: i32) -> RepoResult<Option<Goods>> {
        debug!("Find in goods with id {}.", id_arg);
        goods
            .find(id_arg)
            .get_result::<Goods>(self.db_conn)
            .optional()
            .map_err(|e| e.context(format!("Find goods with id {} error occurred.", id_arg)).into())
    }

    fn list(&self) -> RepoResult<Vec<Goods>> {
        debug!("Find all goods.");
        goods
            .order(id.desc())
            .get_results::<Goods>(self.db_conn)
            .map_err(|e| e.context("Find all goods error occurred.").into())
    }

    fn list_sorted(&self, ordering: Ordering) -> RepoResult<Vec<Goods>> {
        debug!("Find all goods ordered {:?} by name.", ordering);
        let query = goods.into_boxed();
        let query = match ordering {
            Ordering::Ascending => query.order(name.asc()),
            Ordering::Descending => query.order(name.desc()),
        };
        query
            .get_results::<Goods>(self.db_conn)
            .map_err(|e| e.context(format!("Find goods ordered {:?} error occurred.", ordering)).into())
    }

    fn list_by_filter(&self, filter: GoodsFilter) -> RepoResult<Vec<Goods>> {
        debug!("Find goods by filter {:?}.", filter);
        filter_query(&filter)
            .get_results::<Goods>(self.db_conn)
            .map_err(|e| e.context(format!("Find goods by filter {:?} error occurred.", filter)).into())
    }

    fn create(&self, payload: NewGoods) -> RepoResult<Goods> {
        debug!("Create goods {:?}.", payload);
        diesel::insert_into(goods)
            .values(&payload)
            .get_result::<Goods>(self.db_conn)
            .map_err(|e| constraint_error(e, Error::DuplicateGoods, Error::UnknownReference))
            .map_err(|e: FailureError| e.context(format!("Create goods {:?} error occurred.", payload)).into())
    }

    fn update(&self, id_arg: i32, payload: UpdateGoods) -> RepoResult<bool> {
        debug!("Updating goods with id {} and payload {:?}.", id_arg, payload);
        let filter = goods.filter(id.eq(id_arg));
        diesel::update(filter)
            .set((
                name.eq(&payload.name),
                price.eq(payload.price),
                description.eq(&payload.description),
                in_stock.eq(payload.in_stock),
                category_id.eq(payload.category_id),
                producer_id.eq(payload.producer_id),
            ))
            .execute(self.db_conn)
            .map(|count| count > 0)
            .map_err(|e| constraint_error(e, Error::DuplicateGoods, Error::UnknownReference))
            .map_err(|e: FailureError| e.context(format!("Update goods {} with {:?} error occurred.", id_arg, payload)).into())
    }

    fn delete(&self, id_arg: i32) -> RepoResult<bool> {
        debug!("Delete goods with id {}.", id_arg);
        let filter = goods.filter(id.eq(id_arg));
        diesel::delete(filter)
            .execute(self.db_conn)
            .map(|count| count > 0)
            .map_err(|e| e.context(format!("Delete goods with id {} error occurred.", id_arg)).into())
    }
}

/// Builds the filter statement. Clauses are appended in a fixed order:
/// stock flag, category, producer, price range.
pub fn filter_query<'a>(filter: &GoodsFilter) -> BoxedQuery<'a, Pg> {
    let mut query = goods.filter(in_stock.eq(filter.in_stock)).into_boxed();
    if let Some(category) = filter.category() {
        query = query.filter(category_id.eq(category));
    }
    if let Some(producer) = filter.producer() {
        query = query.filter(producer_id.eq(producer));
    }
    if let Some((min, max)) = filter.price_range() {
        query = query.filter(price.between(min, max));
    }
    query.order(name.asc())
}
