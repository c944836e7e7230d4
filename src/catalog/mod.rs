pub mod dataset_info;
pub mod error;
