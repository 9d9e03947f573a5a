//! Goods Services, presents CRUD operations and search with goods
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use errors::Error;
use models::{Goods, GoodsFilter, NewGoods, Ordering, UpdateGoods};
use repos::ReposFactory;

use super::types::ServiceFuture;
use super::{reject, validate_payload, Service};

pub trait GoodsService {
    /// Returns goods by id
    fn get_goods(&self, goods_id: i32) -> ServiceFuture<Goods>;
    /// Returns all goods, newest first
    fn list_goods(&self) -> ServiceFuture<Vec<Goods>>;
    /// Returns all goods ordered by name
    fn list_goods_sorted(&self, ordering: Ordering) -> ServiceFuture<Vec<Goods>>;
    /// Returns goods matching the filter ordered by name
    fn list_goods_by_filter(&self, filter: GoodsFilter) -> ServiceFuture<Vec<Goods>>;
    /// Creates new goods
    fn create_goods(&self, payload: NewGoods) -> ServiceFuture<Goods>;
    /// Updates specific goods, resolves to `false` if they do not exist
    fn update_goods(&self, goods_id: i32, payload: UpdateGoods) -> ServiceFuture<bool>;
    /// Deletes specific goods, resolves to `false` if they do not exist
    fn delete_goods(&self, goods_id: i32) -> ServiceFuture<bool>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > GoodsService for Service<T, M, F>
{
    fn get_goods(&self, goods_id: i32) -> ServiceFuture<Goods> {
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let goods_repo = repo_factory.create_goods_repo(&*conn);
            goods_repo
                .find(goods_id)
                .and_then(|goods| {
                    goods.ok_or_else(|| {
                        format_err!("Goods with id {} not found.", goods_id)
                            .context(Error::NotFound)
                            .into()
                    })
                })
                .map_err(|e: FailureError| e.context("Service goods, get_goods endpoint error occurred.").into())
        })
    }

    fn list_goods(&self) -> ServiceFuture<Vec<Goods>> {
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let goods_repo = repo_factory.create_goods_repo(&*conn);
            goods_repo
                .list()
                .map_err(|e| e.context("Service goods, list_goods endpoint error occurred.").into())
        })
    }

    fn list_goods_sorted(&self, ordering: Ordering) -> ServiceFuture<Vec<Goods>> {
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let goods_repo = repo_factory.create_goods_repo(&*conn);
            goods_repo
                .list_sorted(ordering)
                .map_err(|e| e.context("Service goods, list_goods_sorted endpoint error occurred.").into())
        })
    }

    fn list_goods_by_filter(&self, filter: GoodsFilter) -> ServiceFuture<Vec<Goods>> {
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let goods_repo = repo_factory.create_goods_repo(&*conn);
            goods_repo
                .list_by_filter(filter)
                .map_err(|e| e.context("Service goods, list_goods_by_filter endpoint error occurred.").into())
        })
    }

    fn create_goods(&self, payload: NewGoods) -> ServiceFuture<Goods> {
        if let Err(e) = validate_payload(&payload) {
            return reject(e);
        }
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let goods_repo = repo_factory.create_goods_repo(&*conn);
            goods_repo
                .create(payload)
                .map_err(|e| e.context("Service goods, create_goods endpoint error occurred.").into())
        })
    }

    fn update_goods(&self, goods_id: i32, payload: UpdateGoods) -> ServiceFuture<bool> {
        if let Err(e) = validate_payload(&payload) {
            return reject(e);
        }
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let goods_repo = repo_factory.create_goods_repo(&*conn);
            goods_repo
                .update(goods_id, payload)
                .map_err(|e| e.context("Service goods, update_goods endpoint error occurred.").into())
        })
    }

    fn delete_goods(&self, goods_id: i32) -> ServiceFuture<bool> {
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let goods_repo = repo_factory.create_goods_repo(&*conn);
            goods_repo
                .delete(goods_id)
                .map_err(|e| e.context("Service goods, delete_goods endpoint error occurred.").into())
        })
    }
}
