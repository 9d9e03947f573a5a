use regex::Regex;

/// Maps request paths to routes, first matching pattern wins
pub struct RouteParser<R> {
    regex_and_converters: Vec<(Regex, Box<ParamsConverter<R>>)>,
}

type ParamsConverter<R> = Fn(Vec<&str>) -> Option<R> + Send + Sync;

impl<R> Default for RouteParser<R> {
    fn default() -> Self {
        Self {
            regex_and_converters: Vec::new(),
        }
    }
}

impl<R> RouteParser<R> {
    /// Adds a route without path params
    pub fn add_route<F>(&mut self, regex_pattern: &str, f: F) -> &mut Self
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        self.add_route_with_params(regex_pattern, move |_| Some(f()))
    }

    /// Adds a route whose capture groups are handed to `converter`
    pub fn add_route_with_params<F>(&mut self, regex_pattern: &str, converter: F) -> &mut Self
    where
        F: Fn(Vec<&str>) -> Option<R> + Send + Sync + 'static,
    {
        match Regex::new(regex_pattern) {
            Ok(regex) => self.regex_and_converters.push((regex, Box::new(converter))),
            Err(e) => error!("Route {} is skipped, invalid pattern: {}", regex_pattern, e),
        }
        self
    }

    /// Tries to match `route` against the registered patterns
    pub fn test(&self, route: &str) -> Option<R> {
        self.regex_and_converters.iter().filter_map(|&(ref regex, ref converter)| {
            regex.captures(route).and_then(|captures| {
                let params = captures
                    .iter()
                    .skip(1)
                    .filter_map(|capture| capture.map(|m| m.as_str()))
                    .collect::<Vec<&str>>();
                converter(params)
            })
        }).next()
    }
}

/// List of all routes with params for the app
#[derive(Clone, Debug, PartialEq)]
pub enum Route {
    Healthcheck,
    Categories,
    CategoriesFullNames,
    NewCategory,
    Category(i32),
    Subcategories(i32),
    Producers,
    NewProducer,
    Producer(i32),
    Goods,
    GoodsFilter,
    NewGoods,
    GoodsItem(i32),
}

fn id_param(params: &[&str]) -> Option<i32> {
    params.get(0).and_then(|string_id| string_id.parse::<i32>().ok())
}

pub fn create_route_parser() -> RouteParser<Route> {
    let mut router = RouteParser::default();

    // Healthcheck
    router.add_route(r"^/healthcheck$", || Route::Healthcheck);

    // Categories routes
    router.add_route(r"^/categories$", || Route::Categories);
    router.add_route(r"^/categories/full_names$", || Route::CategoriesFullNames);
    router.add_route(r"^/categories/category$", || Route::NewCategory);

    // Categories/:id route
    router.add_route_with_params(r"^/categories/(\d+)$", |params| id_param(&params).map(Route::Category));

    // Categories/:id/subcategories route
    router.add_route_with_params(r"^/categories/(\d+)/subcategories$", |params| {
        id_param(&params).map(Route::Subcategories)
    });

    // Producers routes
    router.add_route(r"^/producers$", || Route::Producers);
    router.add_route(r"^/producers/producer$", || Route::NewProducer);
    router.add_route_with_params(r"^/producers/(\d+)$", |params| id_param(&params).map(Route::Producer));

    // Goods routes
    router.add_route(r"^/goods$", || Route::Goods);
    router.add_route(r"^/goods/filter$", || Route::GoodsFilter);
    router.add_route(r"^/goods/goods$", || Route::NewGoods);
    router.add_route_with_params(r"^/goods/(\d+)$", |params| id_param(&params).map(Route::GoodsItem));

    router
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_routes_are_parsed() {
        let router = create_route_parser();
        assert_eq!(router.test("/healthcheck"), Some(Route::Healthcheck));
        assert_eq!(router.test("/categories"), Some(Route::Categories));
        assert_eq!(router.test("/categories/full_names"), Some(Route::CategoriesFullNames));
        assert_eq!(router.test("/categories/category"), Some(Route::NewCategory));
        assert_eq!(router.test("/producers/producer"), Some(Route::NewProducer));
        assert_eq!(router.test("/goods/filter"), Some(Route::GoodsFilter));
        assert_eq!(router.test("/goods/goods"), Some(Route::NewGoods));
    }

    #[test]
    fn routes_with_ids_are_parsed() {
        let router = create_route_parser();
        assert_eq!(router.test("/categories/12"), Some(Route::Category(12)));
        assert_eq!(router.test("/categories/3/subcategories"), Some(Route::Subcategories(3)));
        assert_eq!(router.test("/producers/7"), Some(Route::Producer(7)));
        assert_eq!(router.test("/goods/42"), Some(Route::GoodsItem(42)));
    }

    #[test]
    fn unknown_paths_are_not_parsed() {
        let router = create_route_parser();
        assert_eq!(router.test("/categories/abc"), None);
        assert_eq!(router.test("/goods/42/extra"), None);
        assert_eq!(router.test("/categories/99999999999"), None);
        assert_eq!(router.test("/stores"), None);
    }
}
