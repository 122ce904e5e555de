pub mod cell_box;
pub mod grid;
