//! Categories Services, presents CRUD operations with categories
//! and keeps the category tree consistent
use std::collections::HashSet;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use futures::future;
use r2d2::ManageConnection;

use errors::Error;
use models::{validate_category_parent, Category, NewCategory, UpdateCategory, MAX_LEVEL, ROOT_LEVEL, ROOT_PARENT_ID};
use repos::{CategoriesRepo, ReposFactory};

use super::types::ServiceFuture;
use super::{reject, validate_payload, Service};

pub trait CategoriesService {
    /// Returns category by id
    fn get_category(&self, category_id: i32) -> ServiceFuture<Category>;
    /// Returns all categories ordered by level
    fn list_categories(&self) -> ServiceFuture<Vec<Category>>;
    /// Returns categories of one level ordered by name
    fn list_categories_by_level(&self, level: i16) -> ServiceFuture<Vec<Category>>;
    /// Returns categories of `level` below `parent_id`, `0` for categories without parent
    fn list_subcategories(&self, parent_id: i32, level: i16) -> ServiceFuture<Vec<Category>>;
    /// Returns categories of `level` named by their path from the root
    fn list_categories_full_names(&self, level: i16) -> ServiceFuture<Vec<Category>>;
    /// Creates new category
    fn insert_category(&self, payload: NewCategory) -> ServiceFuture<Category>;
    /// Updates specific category, resolves to `false` if it does not exist
    fn update_category(&self, category_id: i32, payload: UpdateCategory) -> ServiceFuture<bool>;
    /// Deletes specific category, resolves to `false` if it does not exist
    fn delete_category(&self, category_id: i32) -> ServiceFuture<bool>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > CategoriesService for Service<T, M, F>
{
    fn get_category(&self, category_id: i32) -> ServiceFuture<Category> {
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn);
            categories_repo
                .find(category_id)
                .and_then(|category| {
                    category.ok_or_else(|| {
                        format_err!("Category with id {} not found.", category_id)
                            .context(Error::NotFound)
                            .into()
                    })
                })
                .map_err(|e: FailureError| e.context("Service categories, get_category endpoint error occurred.").into())
        })
    }

    fn list_categories(&self) -> ServiceFuture<Vec<Category>> {
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn);
            categories_repo
                .list()
                .map_err(|e| e.context("Service categories, list_categories endpoint error occurred.").into())
        })
    }

    fn list_categories_by_level(&self, level: i16) -> ServiceFuture<Vec<Category>> {
        if level < ROOT_LEVEL || level > MAX_LEVEL {
            return Box::new(future::ok(vec![]));
        }
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn);
            categories_repo
                .list_by_level(level)
                .map_err(|e| e.context("Service categories, list_categories_by_level endpoint error occurred.").into())
        })
    }

    fn list_subcategories(&self, parent_id: i32, level: i16) -> ServiceFuture<Vec<Category>> {
        let repo_factory = self.static_context.repo_factory.clone();
        let parent = if parent_id == ROOT_PARENT_ID { None } else { Some(parent_id) };

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn);
            categories_repo
                .list_children(parent, level)
                .map_err(|e| e.context("Service categories, list_subcategories endpoint error occurred.").into())
        })
    }

    fn list_categories_full_names(&self, level: i16) -> ServiceFuture<Vec<Category>> {
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn);
            categories_repo
                .full_names(level)
                .map_err(|e| e.context("Service categories, list_categories_full_names endpoint error occurred.").into())
        })
    }

    fn insert_category(&self, payload: NewCategory) -> ServiceFuture<Category> {
        if let Err(e) = validate_new_category(&payload) {
            return reject(e);
        }
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn);
            insert_into_tree(&*categories_repo, payload)
                .map_err(|e| e.context("Service categories, insert_category endpoint error occurred.").into())
        })
    }

    fn update_category(&self, category_id: i32, payload: UpdateCategory) -> ServiceFuture<bool> {
        if let Err(e) = validate_update_category(category_id, &payload) {
            return reject(e);
        }
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn);
            update_in_tree(&*categories_repo, category_id, payload)
                .map_err(|e| e.context("Service categories, update_category endpoint error occurred.").into())
        })
    }

    fn delete_category(&self, category_id: i32) -> ServiceFuture<bool> {
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn);
            categories_repo
                .delete(category_id)
                .map_err(|e| e.context("Service categories, delete_category endpoint error occurred.").into())
        })
    }
}

fn validate_new_category(payload: &NewCategory) -> Result<(), FailureError> {
    validate_payload(payload)?;
    validate_category_parent(None, payload.parent_id)
        .map_err(|e| format_err!("Invalid parent of new category").context(Error::Validate(e)).into())
}

fn validate_update_category(category_id: i32, payload: &UpdateCategory) -> Result<(), FailureError> {
    validate_payload(payload)?;
    validate_category_parent(Some(category_id), payload.parent_id)
        .map_err(|e| format_err!("Invalid parent of category {}", category_id).context(Error::Validate(e)).into())
}

fn insert_into_tree(categories_repo: &CategoriesRepo, payload: NewCategory) -> Result<Category, FailureError> {
    if payload.has_no_parent() {
        if payload.level != ROOT_LEVEL {
            return Err(format_err!("Category {} without parent has level {}.", payload.name, payload.level)
                .context(Error::RootLevelConflict)
                .into());
        }
        if let Some(root) = categories_repo.find_root()? {
            return Err(format_err!("Root category {} already exists.", root.id)
                .context(Error::RootAlreadyExists)
                .into());
        }
        categories_repo.create_root(payload.name)
    } else {
        if payload.level == ROOT_LEVEL {
            return Err(format_err!("Category {} with parent has root level.", payload.name)
                .context(Error::RootLevelConflict)
                .into());
        }
        categories_repo.create(payload)
    }
}

fn update_in_tree(categories_repo: &CategoriesRepo, category_id: i32, payload: UpdateCategory) -> Result<bool, FailureError> {
    let current = match categories_repo.find(category_id)? {
        Some(current) => current,
        None => return Ok(false),
    };

    // the root keeps its level and stays without parent
    if current.is_root() {
        return categories_repo.rename(category_id, payload.name);
    }

    let new_parent = match payload.parent_id {
        Some(parent) if payload.level != ROOT_LEVEL && parent != ROOT_PARENT_ID => parent,
        _ => {
            return Err(format_err!("Category {} can not become the root.", category_id)
                .context(Error::CannotBecomeRoot)
                .into())
        }
    };

    let all_categories = categories_repo.list()?;
    if is_in_subtree(&all_categories, category_id, new_parent) {
        return Err(format_err!("Category {} can not be moved under {}.", category_id, new_parent)
            .context(Error::CategoryCycle)
            .into());
    }

    categories_repo.update(category_id, payload)
}

/// Checks if `candidate` is `ancestor` itself or lies below it
pub fn is_in_subtree(cats: &[Category], ancestor: i32, candidate: i32) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(candidate);
    while let Some(cat_id) = current {
        if cat_id == ancestor {
            return true;
        }
        if !visited.insert(cat_id) {
            return false;
        }
        current = cats.iter().find(|cat| cat.id == cat_id).and_then(|cat| cat.parent_id);
    }
    false
}
