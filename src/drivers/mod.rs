pub mod counter;
pub mod generator;
