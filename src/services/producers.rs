//! Producers Services, presents CRUD operations with producers
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use errors::Error;
use models::{NewProducer, Ordering, Producer, UpdateProducer};
use repos::ReposFactory;

use super::types::ServiceFuture;
use super::{reject, validate_payload, Service};

pub trait ProducersService {
    /// Returns producer by id
    fn get_producer(&self, producer_id: i32) -> ServiceFuture<Producer>;
    /// Returns all producers
    fn list_producers(&self) -> ServiceFuture<Vec<Producer>>;
    /// Returns all producers ordered by name
    fn list_producers_sorted(&self, ordering: Ordering) -> ServiceFuture<Vec<Producer>>;
    /// Creates new producer
    fn create_producer(&self, payload: NewProducer) -> ServiceFuture<Producer>;
    /// Updates specific producer, resolves to `false` if it does not exist
    fn update_producer(&self, producer_id: i32, payload: UpdateProducer) -> ServiceFuture<bool>;
    /// Deletes specific producer, resolves to `false` if it does not exist
    fn delete_producer(&self, producer_id: i32) -> ServiceFuture<bool>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > ProducersService for Service<T, M, F>
{
    fn get_producer(&self, producer_id: i32) -> ServiceFuture<Producer> {
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let producers_repo = repo_factory.create_producers_repo(&*conn);
            producers_repo
                .find(producer_id)
                .and_then(|producer| {
                    producer.ok_or_else(|| {
                        format_err!("Producer with id {} not found.", producer_id)
                            .context(Error::NotFound)
                            .into()
                    })
                })
                .map_err(|e: FailureError| e.context("Service producers, get_producer endpoint error occurred.").into())
        })
    }

    fn list_producers(&self) -> ServiceFuture<Vec<Producer>> {
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let producers_repo = repo_factory.create_producers_repo(&*conn);
            producers_repo
                .list()
                .map_err(|e| e.context("Service producers, list_producers endpoint error occurred.").into())
        })
    }

    fn list_producers_sorted(&self, ordering: Ordering) -> ServiceFuture<Vec<Producer>> {
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let producers_repo = repo_factory.create_producers_repo(&*conn);
            producers_repo
                .list_sorted(ordering)
                .map_err(|e| e.context("Service producers, list_producers_sorted endpoint error occurred.").into())
        })
    }

    fn create_producer(&self, payload: NewProducer) -> ServiceFuture<Producer> {
        if let Err(e) = validate_payload(&payload) {
            return reject(e);
        }
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let producers_repo = repo_factory.create_producers_repo(&*conn);
            producers_repo
                .create(payload)
                .map_err(|e| e.context("Service producers, create_producer endpoint error occurred.").into())
        })
    }

    fn update_producer(&self, producer_id: i32, payload: UpdateProducer) -> ServiceFuture<bool> {
        if let Err(e) = validate_payload(&payload) {
            return reject(e);
        }
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let producers_repo = repo_factory.create_producers_repo(&*conn);
            producers_repo
                .update(producer_id, payload)
                .map_err(|e| e.context("Service producers, update_producer endpoint error occurred.").into())
        })
    }

    fn delete_producer(&self, producer_id: i32) -> ServiceFuture<bool> {
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let producers_repo = repo_factory.create_producers_repo(&*conn);
            producers_repo
                .delete(producer_id)
                .map_err(|e| e.context("Service producers, delete_producer endpoint error occurred.").into())
        })
    }
}

#[cfg(test)]
pub mod tests {
    use tokio_core::reactor::Core;

    use errors::{error_kind, Error};
    use models::*;
    use repos::repo_factory::tests::*;
    use services::*;

    pub fn new_producer(name: &str) -> NewProducer {
        NewProducer { name: name.to_string() }
    }

    #[test]
    fn test_create_and_get_producer() {
        let mut core = Core::new().unwrap();
        let service = create_service(ReposFactoryMock::default());
        let created = core.run(service.create_producer(new_producer("Acme"))).unwrap();
        let found = core.run(service.get_producer(created.id)).unwrap();
        assert_eq!(found.name, "Acme");
    }

    #[test]
    fn test_create_producer_with_empty_name_fails() {
        let mut core = Core::new().unwrap();
        let service = create_service(ReposFactoryMock::default());
        let err = core.run(service.create_producer(new_producer(""))).unwrap_err();
        match error_kind(&err) {
            Some(&Error::Validate(_)) => {}
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_producer_name_fails() {
        let mut core = Core::new().unwrap();
        let service = create_service(ReposFactoryMock::default());
        core.run(service.create_producer(new_producer("Acme"))).unwrap();
        let err = core.run(service.create_producer(new_producer("Acme"))).unwrap_err();
        match error_kind(&err) {
            Some(&Error::DuplicateName) => {}
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_rename_to_taken_name_fails() {
        let mut core = Core::new().unwrap();
        let service = create_service(ReposFactoryMock::default());
        core.run(service.create_producer(new_producer("Acme"))).unwrap();
        let globex = core.run(service.create_producer(new_producer("Globex"))).unwrap();
        let err = core
            .run(service.update_producer(globex.id, UpdateProducer { name: "Acme".to_string() }))
            .unwrap_err();
        match error_kind(&err) {
            Some(&Error::DuplicateName) => {}
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_update_missing_producer_is_false() {
        let mut core = Core::new().unwrap();
        let service = create_service(ReposFactoryMock::default());
        let updated = core
            .run(service.update_producer(5, UpdateProducer { name: "Initech".to_string() }))
            .unwrap();
        assert!(!updated);
    }

    #[test]
    fn test_list_producers_sorted() {
        let mut core = Core::new().unwrap();
        let service = create_service(ReposFactoryMock::default());
        for name in &["Initech", "Acme", "Globex"] {
            core.run(service.create_producer(new_producer(name))).unwrap();
        }
        let names = |producers: Vec<Producer>| producers.into_iter().map(|p| p.name).collect::<Vec<String>>();
        let ascending = core.run(service.list_producers_sorted(Ordering::Ascending)).unwrap();
        assert_eq!(names(ascending), vec!["Acme", "Globex", "Initech"]);
        let descending = core.run(service.list_producers_sorted(Ordering::Descending)).unwrap();
        assert_eq!(names(descending), vec!["Initech", "Globex", "Acme"]);
        let unsorted = core.run(service.list_producers()).unwrap();
        assert_eq!(names(unsorted), vec!["Initech", "Acme", "Globex"]);
    }

    #[test]
    fn test_delete_producer_twice() {
        let mut core = Core::new().unwrap();
        let service = create_service(ReposFactoryMock::default());
        let created = core.run(service.create_producer(new_producer("Acme"))).unwrap();
        assert!(core.run(service.delete_producer(created.id)).unwrap());
        assert!(!core.run(service.delete_producer(created.id)).unwrap());
    }
}
