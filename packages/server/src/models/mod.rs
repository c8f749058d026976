pub mod product;
pub mod review;
pub mod shared;
