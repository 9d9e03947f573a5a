//! Catalog is a microservice responsible for the goods catalog of an online store.
//! This crate is for running the service from `catalog_lib`. See `catalog_lib` for details.

extern crate catalog_lib;
extern crate env_logger;

use env_logger::{Builder, Env};

fn main() {
    // Prepare logger
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = catalog_lib::config::Config::new().expect("Can't load app config!");

    catalog_lib::start_server(config, &None, || ());
}
