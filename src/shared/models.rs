pub mod app_state;
pub mod clock;
pub mod iso_timestamp;
pub mod settings;
pub mod task;
pub mod task_category;
pub mod task_priority;
pub mod validation;
