pub mod health;
pub mod image;
pub mod product;
pub mod review;
pub mod service;
