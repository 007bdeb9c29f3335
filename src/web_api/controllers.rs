pub mod health_controller;
pub mod stats_controller;
pub mod task_controller;
