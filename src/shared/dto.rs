// Requests
pub mod create_task_request;
pub mod update_task_request;
pub mod task_list_query;
pub mod sync_request;

// Responses
pub mod delete_task_response;
pub mod health_response;
pub mod stats_response;
pub mod sync_response;
