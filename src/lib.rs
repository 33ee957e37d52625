pub mod authentication;
pub mod configuration;
pub mod domain;
pub mod firebase;
pub mod routes;
pub mod sessions;
pub mod startup;
pub mod storage;
pub mod telemetry;
