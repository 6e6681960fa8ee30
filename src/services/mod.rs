pub mod backend;
pub mod news;
