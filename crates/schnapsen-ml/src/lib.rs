pub mod dataset;
pub mod features;
pub mod knn;
pub mod recorder;
pub mod store;
