use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;

use repos::*;

pub trait ReposFactory<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static>: Clone + Send + 'static {
    fn create_categories_repo<'a>(&self, db_conn: &'a C) -> Box<CategoriesRepo + 'a>;
    fn create_producers_repo<'a>(&self, db_conn: &'a C) -> Box<ProducersRepo + 'a>;
    fn create_goods_repo<'a>(&self, db_conn: &'a C) -> Box<GoodsRepo + 'a>;
}

#[derive(Clone, Default)]
pub struct ReposFactoryImpl;

impl<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ReposFactory<C> for ReposFactoryImpl {
    fn create_categories_repo<'a>(&self, db_conn: &'a C) -> Box<CategoriesRepo + 'a> {
        Box::new(CategoriesRepoImpl::new(db_conn)) as Box<CategoriesRepo>
    }
    fn create_producers_repo<'a>(&self, db_conn: &'a C) -> Box<ProducersRepo + 'a> {
        Box::new(ProducersRepoImpl::new(db_conn)) as Box<ProducersRepo>
    }
    fn create_goods_repo<'a>(&self, db_conn: &'a C) -> Box<GoodsRepo + 'a> {
        Box::new(GoodsRepoImpl::new(db_conn)) as Box<GoodsRepo>
    }
}

#[cfg(test)]
pub mod tests {
    use std::error::Error;
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use diesel::connection::AnsiTransactionManager;
    use diesel::connection::SimpleConnection;
    use diesel::deserialize::QueryableByName;
    use diesel::pg::Pg;
    use diesel::query_builder::AsQuery;
    use diesel::query_builder::QueryFragment;
    use diesel::query_builder::QueryId;
    use diesel::sql_types::HasSqlType;
    use diesel::Connection;
    use diesel::ConnectionResult;
    use diesel::QueryResult;
    use diesel::Queryable;
    use futures_cpupool::CpuPool;
    use r2d2;
    use r2d2::ManageConnection;

    use controller::context::StaticContext;
    use errors::Error as MyError;
    use models::*;
    use repos::*;
    use services::*;

    pub fn create_service(factory: ReposFactoryMock) -> Service<MockConnection, MockConnectionManager, ReposFactoryMock> {
        let manager = MockConnectionManager::default();
        let db_pool = r2d2::Pool::builder().build(manager).expect("Failed to create connection pool");
        let cpu_pool = CpuPool::new(1);

        let static_context = StaticContext::new(db_pool, cpu_pool, factory);

        Service::new(static_context)
    }

    /// Rows shared by all mock repos of one factory
    #[derive(Default)]
    pub struct MockStorage {
        pub categories: Vec<Category>,
        pub producers: Vec<Producer>,
        pub goods: Vec<Goods>,
        next_id: i32,
    }

    impl MockStorage {
        fn next_id(&mut self) -> i32 {
            self.next_id += 1;
            self.next_id
        }
    }

    #[derive(Clone, Default)]
    pub struct ReposFactoryMock {
        pub storage: Arc<Mutex<MockStorage>>,
    }

    impl ReposFactoryMock {
        pub fn with_root(root_name: &str) -> Self {
            let factory = ReposFactoryMock::default();
            {
                let mut storage = factory.storage.lock().unwrap();
                let id = storage.next_id();
                storage.categories.push(Category {
                    id,
                    name: root_name.to_string(),
                    level: ROOT_LEVEL,
                    parent_id: None,
                });
            }
            factory
        }
    }

    impl<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ReposFactory<C> for ReposFactoryMock {
        fn create_categories_repo<'a>(&self, _db_conn: &'a C) -> Box<CategoriesRepo + 'a> {
            Box::new(CategoriesRepoMock {
                storage: self.storage.clone(),
            }) as Box<CategoriesRepo>
        }
        fn create_producers_repo<'a>(&self, _db_conn: &'a C) -> Box<ProducersRepo + 'a> {
            Box::new(ProducersRepoMock {
                storage: self.storage.clone(),
            }) as Box<ProducersRepo>
        }
        fn create_goods_repo<'a>(&self, _db_conn: &'a C) -> Box<GoodsRepo + 'a> {
            Box::new(GoodsRepoMock {
                storage: self.storage.clone(),
            }) as Box<GoodsRepo>
        }
    }

    fn violation<T>(kind: MyError) -> RepoResult<T> {
        Err(format_err!("Constraint violation").context(kind).into())
    }

    #[derive(Clone)]
    pub struct CategoriesRepoMock {
        storage: Arc<Mutex<MockStorage>>,
    }

    impl CategoriesRepo for CategoriesRepoMock {
        fn find(&self, id_arg: i32) -> RepoResult<Option<Category>> {
            let storage = self.storage.lock().unwrap();
            Ok(storage.categories.iter().find(|cat| cat.id == id_arg).cloned())
        }

        fn find_root(&self) -> RepoResult<Option<Category>> {
            let storage = self.storage.lock().unwrap();
            Ok(storage.categories.iter().find(|cat| cat.parent_id.is_none()).cloned())
        }

        fn list(&self) -> RepoResult<Vec<Category>> {
            let storage = self.storage.lock().unwrap();
            let mut cats = storage.categories.clone();
            cats.sort_by_key(|cat| (cat.level, cat.id));
            Ok(cats)
        }

        fn list_by_level(&self, level_arg: i16) -> RepoResult<Vec<Category>> {
            let storage = self.storage.lock().unwrap();
            let mut cats: Vec<Category> = storage.categories.iter().filter(|cat| cat.level == level_arg).cloned().collect();
            cats.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(cats)
        }

        fn list_children(&self, parent_arg: Option<i32>, level_arg: i16) -> RepoResult<Vec<Category>> {
            let storage = self.storage.lock().unwrap();
            let mut cats: Vec<Category> = storage
                .categories
                .iter()
                .filter(|cat| cat.level == level_arg && cat.parent_id == parent_arg)
                .cloned()
                .collect();
            cats.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(cats)
        }

        fn full_names(&self, level_arg: i16) -> RepoResult<Vec<Category>> {
            let storage = self.storage.lock().unwrap();
            Ok(full_paths(&storage.categories, level_arg))
        }

        fn create_root(&self, name_arg: String) -> RepoResult<Category> {
            let mut storage = self.storage.lock().unwrap();
            let category = Category {
                id: storage.next_id(),
                name: name_arg,
                level: ROOT_LEVEL,
                parent_id: None,
            };
            storage.categories.push(category.clone());
            Ok(category)
        }

        fn create(&self, payload: NewCategory) -> RepoResult<Category> {
            let mut storage = self.storage.lock().unwrap();
            if let Some(parent) = payload.parent_id {
                if !storage.categories.iter().any(|cat| cat.id == parent) {
                    return violation(MyError::UnknownReference);
                }
            }
            let category = Category {
                id: storage.next_id(),
                name: payload.name,
                level: payload.level,
                parent_id: payload.parent_id,
            };
            storage.categories.push(category.clone());
            Ok(category)
        }

        fn rename(&self, id_arg: i32, name_arg: String) -> RepoResult<bool> {
            let mut storage = self.storage.lock().unwrap();
            Ok(match storage.categories.iter_mut().find(|cat| cat.id == id_arg) {
                Some(cat) => {
                    cat.name = name_arg;
                    true
                }
                None => false,
            })
        }

        fn update(&self, id_arg: i32, payload: UpdateCategory) -> RepoResult<bool> {
            let mut storage = self.storage.lock().unwrap();
            if let Some(parent) = payload.parent_id {
                if !storage.categories.iter().any(|cat| cat.id == parent) {
                    return violation(MyError::UnknownReference);
                }
            }
            Ok(match storage.categories.iter_mut().find(|cat| cat.id == id_arg) {
                Some(cat) => {
                    cat.name = payload.name;
                    cat.level = payload.level;
                    cat.parent_id = payload.parent_id;
                    true
                }
                None => false,
            })
        }

        fn delete(&self, id_arg: i32) -> RepoResult<bool> {
            let mut storage = self.storage.lock().unwrap();
            let referenced = storage.goods.iter().any(|g| g.category_id == id_arg)
                || storage.categories.iter().any(|cat| cat.parent_id == Some(id_arg));
            if referenced {
                return violation(MyError::ReferentialConflict);
            }
            let before = storage.categories.len();
            storage.categories.retain(|cat| cat.id != id_arg);
            Ok(storage.categories.len() < before)
        }
    }

    #[derive(Clone)]
    pub struct ProducersRepoMock {
        storage: Arc<Mutex<MockStorage>>,
    }

    impl ProducersRepo for ProducersRepoMock {
        fn find(&self, id_arg: i32) -> RepoResult<Option<Producer>> {
            let storage = self.storage.lock().unwrap();
            Ok(storage.producers.iter().find(|p| p.id == id_arg).cloned())
        }

        fn list(&self) -> RepoResult<Vec<Producer>> {
            let storage = self.storage.lock().unwrap();
            Ok(storage.producers.clone())
        }

        fn list_sorted(&self, ordering: Ordering) -> RepoResult<Vec<Producer>> {
            let storage = self.storage.lock().unwrap();
            let mut producers = storage.producers.clone();
            producers.sort_by(|a, b| a.name.cmp(&b.name));
            if ordering == Ordering::Descending {
                producers.reverse();
            }
            Ok(producers)
        }

        fn create(&self, payload: NewProducer) -> RepoResult<Producer> {
            let mut storage = self.storage.lock().unwrap();
            if storage.producers.iter().any(|p| p.name == payload.name) {
                return violation(MyError::DuplicateName);
            }
            let producer = Producer {
                id: storage.next_id(),
                name: payload.name,
            };
            storage.producers.push(producer.clone());
            Ok(producer)
        }

        fn update(&self, id_arg: i32, payload: UpdateProducer) -> RepoResult<bool> {
            let mut storage = self.storage.lock().unwrap();
            if storage.producers.iter().any(|p| p.id != id_arg && p.name == payload.name) {
                return violation(MyError::DuplicateName);
            }
            Ok(match storage.producers.iter_mut().find(|p| p.id == id_arg) {
                Some(producer) => {
                    producer.name = payload.name;
                    true
                }
                None => false,
            })
        }

        fn delete(&self, id_arg: i32) -> RepoResult<bool> {
            let mut storage = self.storage.lock().unwrap();
            if storage.goods.iter().any(|g| g.producer_id == id_arg) {
                return violation(MyError::ReferentialConflict);
            }
            let before = storage.producers.len();
            storage.producers.retain(|p| p.id != id_arg);
            Ok(storage.producers.len() < before)
        }
    }

    #[derive(Clone)]
    pub struct GoodsRepoMock {
        storage: Arc<Mutex<MockStorage>>,
    }

    impl GoodsRepoMock {
        fn check_references(storage: &MockStorage, category: i32, producer: i32) -> RepoResult<()> {
            let category_exists = storage.categories.iter().any(|cat| cat.id == category);
            let producer_exists = storage.producers.iter().any(|p| p.id == producer);
            if category_exists && producer_exists {
                Ok(())
            } else {
                violation(MyError::UnknownReference)
            }
        }
    }

    impl GoodsRepo for GoodsRepoMock {
        fn find(&self, id_arg: i32) -> RepoResult<Option<Goods>> {
            let storage = self.storage.lock().unwrap();
            Ok(storage.goods.iter().find(|g| g.id == id_arg).cloned())
        }

        fn list(&self) -> RepoResult<Vec<Goods>> {
            let storage = self.storage.lock().unwrap();
            let mut goods = storage.goods.clone();
            goods.sort_by(|a, b| b.id.cmp(&a.id));
            Ok(goods)
        }

        fn list_sorted(&self, ordering: Ordering) -> RepoResult<Vec<Goods>> {
            let storage = self.storage.lock().unwrap();
            let mut goods = storage.goods.clone();
            goods.sort_by(|a, b| a.name.cmp(&b.name));
            if ordering == Ordering::Descending {
                goods.reverse();
            }
            Ok(goods)
        }

        fn list_by_filter(&self, filter: GoodsFilter) -> RepoResult<Vec<Goods>> {
            let storage = self.storage.lock().unwrap();
            let mut goods: Vec<Goods> = storage
                .goods
                .iter()
                .filter(|g| g.in_stock == filter.in_stock)
                .filter(|g| filter.category().map_or(true, |category| g.category_id == category))
                .filter(|g| filter.producer().map_or(true, |producer| g.producer_id == producer))
                .filter(|g| filter.price_range().map_or(true, |(min, max)| g.price >= min && g.price <= max))
                .cloned()
                .collect();
            goods.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(goods)
        }

        fn create(&self, payload: NewGoods) -> RepoResult<Goods> {
            let mut storage = self.storage.lock().unwrap();
            GoodsRepoMock::check_references(&storage, payload.category_id, payload.producer_id)?;
            let duplicate = storage.goods.iter().any(|g| {
                g.name == payload.name
                    && g.price == payload.price
                    && g.category_id == payload.category_id
                    && g.producer_id == payload.producer_id
            });
            if duplicate {
                return violation(MyError::DuplicateGoods);
            }
            let goods = Goods {
                id: storage.next_id(),
                name: payload.name,
                price: payload.price,
                description: payload.description,
                in_stock: payload.in_stock,
                category_id: payload.category_id,
                producer_id: payload.producer_id,
            };
            storage.goods.push(goods.clone());
            Ok(goods)
        }

        fn update(&self, id_arg: i32, payload: UpdateGoods) -> RepoResult<bool> {
            let mut storage = self.storage.lock().unwrap();
            GoodsRepoMock::check_references(&storage, payload.category_id, payload.producer_id)?;
            Ok(match storage.goods.iter_mut().find(|g| g.id == id_arg) {
                Some(goods) => {
                    goods.name = payload.name;
                    goods.price = payload.price;
                    goods.description = payload.description;
                    goods.in_stock = payload.in_stock;
                    goods.category_id = payload.category_id;
                    goods.producer_id = payload.producer_id;
                    true
                }
                None => false,
            })
        }

        fn delete(&self, id_arg: i32) -> RepoResult<bool> {
            let mut storage = self.storage.lock().unwrap();
            let before = storage.goods.len();
            storage.goods.retain(|g| g.id != id_arg);
            Ok(storage.goods.len() < before)
        }
    }

    #[derive(Default)]
    pub struct MockConnection {
        tr: AnsiTransactionManager,
    }

    impl Connection for MockConnection {
        type Backend = Pg;
        type TransactionManager = AnsiTransactionManager;

        fn establish(_database_url: &str) -> ConnectionResult<MockConnection> {
            Ok(MockConnection::default())
        }

        fn execute(&self, _query: &str) -> QueryResult<usize> {
            unimplemented!()
        }

        fn query_by_index<T, U>(&self, _source: T) -> QueryResult<Vec<U>>
        where
            T: AsQuery,
            T::Query: QueryFragment<Pg> + QueryId,
            Pg: HasSqlType<T::SqlType>,
            U: Queryable<T::SqlType, Pg>,
        {
            unimplemented!()
        }

        fn query_by_name<T, U>(&self, _source: &T) -> QueryResult<Vec<U>>
        where
            T: QueryFragment<Pg> + QueryId,
            U: QueryableByName<Pg>,
        {
            unimplemented!()
        }

        fn execute_returning_count<T>(&self, _source: &T) -> QueryResult<usize>
        where
            T: QueryFragment<Pg> + QueryId,
        {
            unimplemented!()
        }

        fn transaction_manager(&self) -> &Self::TransactionManager {
            &self.tr
        }
    }

    impl SimpleConnection for MockConnection {
        fn batch_execute(&self, _query: &str) -> QueryResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MockConnectionManager;

    impl ManageConnection for MockConnectionManager {
        type Connection = MockConnection;
        type Error = MockError;

        fn connect(&self) -> Result<MockConnection, MockError> {
            Ok(MockConnection::default())
        }

        fn is_valid(&self, _conn: &mut MockConnection) -> Result<(), MockError> {
            Ok(())
        }

        fn has_broken(&self, _conn: &mut MockConnection) -> bool {
            false
        }
    }

    #[derive(Debug)]
    pub struct MockError {}

    impl fmt::Display for MockError {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "Mock connection failed")
        }
    }

    impl Error for MockError {
        fn description(&self) -> &str {
            "Mock connection failed"
        }

        fn cause(&self) -> Option<&Error> {
            None
        }
    }
}
