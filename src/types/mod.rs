pub mod grid;
pub mod tabular_frame;
