pub mod render;
pub mod webhook;
