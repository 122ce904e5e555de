pub mod bc;
pub mod field;
