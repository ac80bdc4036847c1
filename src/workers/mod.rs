pub mod dispatcher;
pub mod render;
