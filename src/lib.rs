//---------------------------------------
pub mod web_api {
    pub mod routes;
    pub mod controllers;
    pub mod api_error;
    pub mod extract;
}

pub use web_api::routes::{build_app, map_routes};
pub use web_api::controllers::*;
pub use web_api::{api_error, extract};
//---------------------------------------

//---------------------------------------
pub mod shared {
    pub mod models;
    pub mod dto;
}

pub use shared::models::*;
pub use shared::dto::*;
//---------------------------------------

//---------------------------------------
pub mod data_access {
    pub mod task_store;
    pub mod data_context;
    pub mod in_memory;
}

pub use data_access::*;
//---------------------------------------

//---------------------------------------
pub mod services {
    pub mod task_service;
    pub mod analytics;
}

pub use services::*;
//---------------------------------------

pub mod telemetry;
