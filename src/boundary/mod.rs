pub mod face;
pub mod obstacle;
pub mod overlap;
pub mod registry;
