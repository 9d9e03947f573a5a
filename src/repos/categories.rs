//! Repos contains all info about working with categories
use std::collections::{HashMap, HashSet, VecDeque};

use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;
use failure::Fail;

use errors::Error;
use models::{Category, NewCategory, UpdateCategory, MAX_LEVEL, ROOT_LEVEL};
use repos::error::constraint_error;
use repos::types::RepoResult;
use schema::categories::dsl::*;

/// Separator between names in a full category path
pub const FULL_NAME_SEPARATOR: &str = "->";
/// Max number of rows returned by a full path request
pub const FULL_NAMES_LIMIT: usize = 100;

/// Categories repository, responsible for handling categories
pub struct CategoriesRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
}

pub trait CategoriesRepo {
    /// Find specific category by id
    fn find(&self, id_arg: i32) -> RepoResult<Option<Category>>;

    /// Find the category without parent
    fn find_root(&self) -> RepoResult<Option<Category>>;

    /// Returns all categories ordered by level
    fn list(&self) -> RepoResult<Vec<Category>>;

    /// Returns categories of one level ordered by name
    fn list_by_level(&self, level_arg: i16) -> RepoResult<Vec<Category>>;

    /// Returns categories of `level_arg` under `parent_arg`, `None` parent matches
    /// categories without parent
    fn list_children(&self, parent_arg: Option<i32>, level_arg: i16) -> RepoResult<Vec<Category>>;

    /// Returns categories of one level with the path from the root in `name`
    fn full_names(&self, level_arg: i16) -> RepoResult<Vec<Category>>;

    /// Creates the root category, only the name is stored
    fn create_root(&self, name_arg: String) -> RepoResult<Category>;

    /// Creates new category under an existing parent
    fn create(&self, payload: NewCategory) -> RepoResult<Category>;

    /// Renames specific category, returns `false` if nothing was updated
    fn rename(&self, id_arg: i32, name_arg: String) -> RepoResult<bool>;

    /// Updates name, level and parent of specific category
    fn update(&self, id_arg: i32, payload: UpdateCategory) -> RepoResult<bool>;

    /// Deletes specific category, returns `false` if nothing was deleted
    fn delete(&self, id_arg: i32) -> RepoResult<bool>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CategoriesRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T) -> Self {
        Self { db_conn }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CategoriesRepo for CategoriesRepoImpl<'a, T> {
    fn find(&self, id_arg: i32) -> RepoResult<Option<Category>> {
        debug!("Find in categories with id {}.", id_arg);
        categories
            .find(id_arg)
            .get_result::<Category>(self.db_conn)
            .optional()
            .map_err(|e| e.context(format!("Find category with id {} error occurred.", id_arg)).into())
    }

    fn find_root(&self) -> RepoResult<Option<Category>> {
        debug!("Find root category.");
        categories
            .filter(parent_id.is_null())
            .order(id)
            .first::<Category>(self.db_conn)
            .optional()
            .map_err(|e| e.context("Find root category error occurred.").into())
    }

    fn list(&self) -> RepoResult<Vec<Category>> {
        debug!("Find all categories.");
        categories
            .order((level, id))
            .get_results::<Category>(self.db_conn)
            .map_err(|e| e.context("Find all categories error occurred.").into())
    }

    fn list_by_level(&self, level_arg: i16) -> RepoResult<Vec<Category>> {
        debug!("Find categories of level {}.", level_arg);
        categories
            .filter(level.eq(level_arg))
            .order(name)
            .get_results::<Category>(self.db_conn)
            .map_err(|e| e.context(format!("Find categories of level {} error occurred.", level_arg)).into())
    }

    fn list_children(&self, parent_arg: Option<i32>, level_arg: i16) -> RepoResult<Vec<Category>> {
        debug!("Find categories of level {} with parent {:?}.", level_arg, parent_arg);
        let query = categories.filter(level.eq(level_arg)).into_boxed();
        let query = match parent_arg {
            Some(parent) => query.filter(parent_id.eq(parent)),
            None => query.filter(parent_id.is_null()),
        };
        query
            .order(name)
            .get_results::<Category>(self.db_conn)
            .map_err(|e| {
                e.context(format!(
                    "Find categories of level {} with parent {:?} error occurred.",
                    level_arg, parent_arg
                )).into()
            })
    }

    fn full_names(&self, level_arg: i16) -> RepoResult<Vec<Category>> {
        debug!("Find full names of categories of level {}.", level_arg);
        categories
            .order(id)
            .get_results::<Category>(self.db_conn)
            .map(|cats| full_paths(&cats, level_arg))
            .map_err(|e| e.context(format!("Find full names of level {} error occurred.", level_arg)).into())
    }

    fn create_root(&self, name_arg: String) -> RepoResult<Category> {
        debug!("Create root category {}.", name_arg);
        diesel::insert_into(categories)
            .values(name.eq(&name_arg))
            .get_result::<Category>(self.db_conn)
            .map_err(|e| e.context(format!("Create root category {} error occurred.", name_arg)).into())
    }

    fn create(&self, payload: NewCategory) -> RepoResult<Category> {
        debug!("Create category {:?}.", payload);
        diesel::insert_into(categories)
            .values(&payload)
            .get_result::<Category>(self.db_conn)
            .map_err(|e| constraint_error(e, Error::UnknownReference, Error::UnknownReference))
            .map_err(|e: FailureError| e.context(format!("Create category {:?} error occurred.", payload)).into())
    }

    fn rename(&self, id_arg: i32, name_arg: String) -> RepoResult<bool> {
        debug!("Rename category {} to {}.", id_arg, name_arg);
        let filter = categories.filter(id.eq(id_arg));
        diesel::update(filter)
            .set(name.eq(&name_arg))
            .execute(self.db_conn)
            .map(|count| count > 0)
            .map_err(|e| e.context(format!("Rename category {} error occurred.", id_arg)).into())
    }

    fn update(&self, id_arg: i32, payload: UpdateCategory) -> RepoResult<bool> {
        debug!("Updating category with id {} and payload {:?}.", id_arg, payload);
        let filter = categories.filter(id.eq(id_arg));
        diesel::update(filter)
            .set((name.eq(&payload.name), level.eq(payload.level), parent_id.eq(payload.parent_id)))
            .execute(self.db_conn)
            .map(|count| count > 0)
            .map_err(|e| constraint_error(e, Error::UnknownReference, Error::UnknownReference))
            .map_err(|e: FailureError| e.context(format!("Update category {} with {:?} error occurred.", id_arg, payload)).into())
    }

    fn delete(&self, id_arg: i32) -> RepoResult<bool> {
        debug!("Delete category with id {}.", id_arg);
        let filter = categories.filter(id.eq(id_arg));
        diesel::delete(filter)
            .execute(self.db_conn)
            .map(|count| count > 0)
            .map_err(|e| constraint_error(e, Error::ReferentialConflict, Error::ReferentialConflict))
            .map_err(|e: FailureError| e.context(format!("Delete category with id {} error occurred.", id_arg)).into())
    }
}

/// Walks the tree breadth first from every category without parent and
/// returns categories of `level_arg` with the accumulated path in `name`.
/// Rows reachable twice (cyclic data) are expanded once.
pub fn full_paths(cats: &[Category], level_arg: i16) -> Vec<Category> {
    if level_arg < ROOT_LEVEL || level_arg > MAX_LEVEL {
        return vec![];
    }

    let mut children: HashMap<i32, Vec<&Category>> = HashMap::new();
    for cat in cats {
        if let Some(parent) = cat.parent_id {
            children.entry(parent).or_insert_with(Vec::new).push(cat);
        }
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    for cat in cats.iter().filter(|cat| cat.parent_id.is_none()) {
        visited.insert(cat.id);
        queue.push_back((cat, cat.name.clone()));
    }

    let mut result = vec![];
    while let Some((cat, path)) = queue.pop_front() {
        for child in children.get(&cat.id).into_iter().flat_map(|kids| kids.iter()) {
            if visited.insert(child.id) {
                queue.push_back((*child, format!("{}{}{}", path, FULL_NAME_SEPARATOR, child.name)));
            }
        }
        if cat.level == level_arg {
            result.push(Category {
                name: path,
                ..cat.clone()
            });
            if result.len() == FULL_NAMES_LIMIT {
                break;
            }
        }
    }
    result
}
