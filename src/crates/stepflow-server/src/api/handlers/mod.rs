//! HTTP request handlers

pub mod health;
pub mod ideation;
pub mod threads;
pub mod workflows;
pub mod youtube;

pub use health::health;
pub use ideation::{draft_post, generate_ideas, publish_content};
pub use threads::{delete_thread, get_thread, list_threads, update_thread};
pub use workflows::{invoke_workflow, list_workflows, stream_workflow};
pub use youtube::youtube_publish;
