// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod docker_repo;
pub mod exposition;
pub mod models;
pub mod netns;
pub mod netstat;
pub mod routes;
pub mod snapshot_store;
pub mod worker;
