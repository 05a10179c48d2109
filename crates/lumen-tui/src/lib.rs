mod app;
pub mod event;
mod keys;
pub mod model;
pub mod pages;
pub mod root;
pub mod session;
pub mod task;

#[cfg(test)]
mod test_support;

pub use app::run;
pub use event::Event;
pub use model::Model;
pub use pages::{DetailPage, ListPage, Page, RunSource, RunnerPage};
pub use root::root_page;
pub use session::Session;
pub use task::Task;
