pub mod aggregate;
pub mod error;
pub mod normalize;
pub mod regrid;
