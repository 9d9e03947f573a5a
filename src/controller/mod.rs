//! `Controller` is a top layer that handles all http-related
//! stuff like reading bodies, parsing params, forming a response.
//! Basically it provides inputs to `Service` layer and converts outputs
//! of `Service` layer to http responses

pub mod context;
pub mod error;
pub mod routes;
pub mod utils;
pub mod xml;

use std::collections::HashMap;
use std::sync::Arc;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use futures::future;
use futures::Future;
use hyper;
use hyper::header::ContentType;
use hyper::server::{Request, Service as HyperService};
use hyper::{Delete, Get, Post, Put, Response, StatusCode};
use r2d2::ManageConnection;
use serde::ser::Serialize;

use self::context::StaticContext;
use self::error::error_response;
use self::routes::{Route, RouteParser};
use self::utils::*;
use self::xml::{ToXMLElement, XMLListItem};
use errors::{print_chain, Error};
use models::*;
use repos::repo_factory::*;
use services::*;

pub type ControllerFuture = Box<Future<Item = Response, Error = FailureError>>;

/// Handles a request and resolves to a response or to an error with a kind
pub trait Controller {
    fn call(&self, req: Request) -> ControllerFuture;
}

/// Controller handles route parsing and calling `Service` layer
pub struct ControllerImpl<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    pub static_context: StaticContext<T, M, F>,
    pub route_parser: Arc<RouteParser<Route>>,
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > ControllerImpl<T, M, F>
{
    /// Create a new controller based on services
    pub fn new(static_context: StaticContext<T, M, F>) -> Self {
        let route_parser = Arc::new(routes::create_route_parser());
        Self {
            route_parser,
            static_context,
        }
    }
}

macro_rules! try_future {
    ($e:expr) => {
        match $e {
            Ok(value) => value,
            Err(e) => return Box::new(future::err(e)),
        }
    };
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > Controller for ControllerImpl<T, M, F>
{
    /// Handle a request and get future response
    fn call(&self, req: Request) -> ControllerFuture {
        let (method, uri, _, headers, body) = req.deconstruct();
        let route = self.route_parser.test(uri.path());

        // GET /healthcheck
        if method == Get && route == Some(Route::Healthcheck) {
            return Box::new(future::ok(response_with_body(
                StatusCode::Ok,
                ContentType::json(),
                "\"Ok\"".to_string(),
            )));
        }

        let route = try_future!(route.ok_or_else(|| not_found(uri.path())));
        let (request_format, format) = try_future!(negotiate_formats(&headers));
        let params = parse_query(uri.query().unwrap_or_default());
        let service = Service::new(self.static_context.clone());

        match (&method, route) {
            // GET /categories
            (&Get, Route::Categories) => match try_future!(query_param::<i16>(&params, "level")) {
                Some(level) => render_list(format, service.list_categories_by_level(level), "categories"),
                None => render_list(format, service.list_categories(), "categories"),
            },

            // GET /categories/full_names
            (&Get, Route::CategoriesFullNames) => {
                let level = try_future!(level_param(&params));
                render_value(StatusCode::Ok, format, service.list_categories_full_names(level))
            }

            // GET /categories/<category_id>
            (&Get, Route::Category(category_id)) => render_value(StatusCode::Ok, format, service.get_category(category_id)),

            // GET /categories/<category_id>/subcategories
            (&Get, Route::Subcategories(parent_id)) => {
                let level = try_future!(level_param(&params));
                render_list(format, service.list_subcategories(parent_id, level), "subcategories")
            }

            // POST /categories/category
            (&Post, Route::NewCategory) => render_value(
                StatusCode::Created,
                format,
                parse_body::<NewCategory>(body, request_format).and_then(move |payload| service.insert_category(payload)),
            ),

            // PUT /categories/<category_id>
            (&Put, Route::Category(category_id)) => render_affected(
                parse_body::<UpdateCategory>(body, request_format)
                    .and_then(move |payload| service.update_category(category_id, payload)),
                "Category",
            ),

            // DELETE /categories/<category_id>
            (&Delete, Route::Category(category_id)) => render_affected(service.delete_category(category_id), "Category"),

            // GET /producers
            (&Get, Route::Producers) => match try_future!(sort_param(&params)) {
                Some(ordering) => render_list(format, service.list_producers_sorted(ordering), "producers"),
                None => render_list(format, service.list_producers(), "producers"),
            },

            // GET /producers/<producer_id>
            (&Get, Route::Producer(producer_id)) => render_value(StatusCode::Ok, format, service.get_producer(producer_id)),

            // POST /producers/producer
            (&Post, Route::NewProducer) => render_value(
                StatusCode::Created,
                format,
                parse_body::<NewProducer>(body, request_format).and_then(move |payload| service.create_producer(payload)),
            ),

            // PUT /producers/<producer_id>
            (&Put, Route::Producer(producer_id)) => render_affected(
                parse_body::<UpdateProducer>(body, request_format)
                    .and_then(move |payload| service.update_producer(producer_id, payload)),
                "Producer",
            ),

            // DELETE /producers/<producer_id>
            (&Delete, Route::Producer(producer_id)) => render_affected(service.delete_producer(producer_id), "Producer"),

            // GET /goods
            (&Get, Route::Goods) => match try_future!(sort_param(&params)) {
                Some(ordering) => render_list(format, service.list_goods_sorted(ordering), "goods"),
                None => render_list(format, service.list_goods(), "goods"),
            },

            // GET /goods/filter
            (&Get, Route::GoodsFilter) => {
                let filter = try_future!(goods_filter(&params));
                render_value(StatusCode::Ok, format, service.list_goods_by_filter(filter))
            }

            // GET /goods/<goods_id>
            (&Get, Route::GoodsItem(goods_id)) => render_value(StatusCode::Ok, format, service.get_goods(goods_id)),

            // POST /goods/goods
            (&Post, Route::NewGoods) => render_value(
                StatusCode::Created,
                format,
                parse_body::<NewGoods>(body, request_format).and_then(move |payload| service.create_goods(payload)),
            ),

            // PUT /goods/<goods_id>
            (&Put, Route::GoodsItem(goods_id)) => render_affected(
                parse_body::<UpdateGoods>(body, request_format).and_then(move |payload| service.update_goods(goods_id, payload)),
                "Goods",
            ),

            // DELETE /goods/<goods_id>
            (&Delete, Route::GoodsItem(goods_id)) => render_affected(service.delete_goods(goods_id), "Goods"),

            // Fallback
            (method, _) => Box::new(future::err(not_found(&format!("{} {}", method, uri.path())))),
        }
    }
}

fn not_found(what: &str) -> FailureError {
    format_err!("No route for {}", what).context(Error::NotFound).into()
}

fn level_param(params: &HashMap<String, String>) -> Result<i16, FailureError> {
    query_param::<i16>(params, "level").map(|level| level.unwrap_or(SUB_CATEGORY_LEVEL))
}

/// Absent filter parameters keep their defaults
fn goods_filter(params: &HashMap<String, String>) -> Result<GoodsFilter, FailureError> {
    let defaults = GoodsFilter::default();
    Ok(GoodsFilter {
        min_price: query_param(params, "min_price")?.unwrap_or(defaults.min_price),
        max_price: query_param(params, "max_price")?.unwrap_or(defaults.max_price),
        category_id: query_param(params, "category_id")?.unwrap_or(defaults.category_id),
        producer_id: query_param(params, "producer_id")?.unwrap_or(defaults.producer_id),
        in_stock: query_param(params, "in_stock")?.unwrap_or(defaults.in_stock),
    })
}

fn render_value<V, Fut>(status: StatusCode, format: Format, fut: Fut) -> ControllerFuture
where
    V: Serialize + ToXMLElement + 'static,
    Fut: Future<Item = V, Error = FailureError> + 'static,
{
    Box::new(fut.and_then(move |value| render(status, format, value)))
}

fn render_list<V, Fut>(format: Format, fut: Fut, what: &'static str) -> ControllerFuture
where
    V: Serialize + XMLListItem + 'static,
    Fut: Future<Item = Vec<V>, Error = FailureError> + 'static,
{
    Box::new(
        fut.and_then(move |items| non_empty(items, what))
            .and_then(move |items| render(StatusCode::Ok, format, items)),
    )
}

fn render_affected<Fut>(fut: Fut, what: &'static str) -> ControllerFuture
where
    Fut: Future<Item = bool, Error = FailureError> + 'static,
{
    Box::new(fut.and_then(move |found| affected(found, what)))
}

/// Hyper service that turns controller errors into http answers
pub struct Application {
    controller: Box<Controller>,
}

impl Application {
    pub fn new<C: Controller + 'static>(controller: C) -> Self {
        Self {
            controller: Box::new(controller),
        }
    }
}

impl HyperService for Application {
    type Request = Request;
    type Response = Response;
    type Error = hyper::Error;
    type Future = Box<Future<Item = Response, Error = hyper::Error>>;

    fn call(&self, req: Request) -> Self::Future {
        let description = format!("{} {}", req.method(), req.path());
        debug!("Received request {}", description);

        Box::new(self.controller.call(req).then(move |result| -> Result<Response, hyper::Error> {
            match result {
                Ok(response) => {
                    debug!("Request {} answered with {}", description, response.status());
                    Ok(response)
                }
                Err(err) => {
                    error!("Request {} failed: {}", description, print_chain(&err));
                    Ok(error_response(&err))
                }
            }
        }))
    }
}
