#![doc = "The `todo_list_api` library crate."]
#![doc = ""]
#![doc = "Domain models, persistence, authentication, routing and error handling for the"]
#![doc = "Todo List API. The binary (`main.rs`) wires these into an actix-web server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
