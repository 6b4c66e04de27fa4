pub mod arena;
pub mod connections;
pub mod feed;
pub mod journey;
pub mod planner;
pub mod time;
