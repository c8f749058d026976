pub mod product;
pub mod product_image;
pub mod product_review;
pub mod product_service;
