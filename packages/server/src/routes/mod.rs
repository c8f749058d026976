use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

/// Routes mounted under `/api`.
pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::health::health))
        .nest("/products", product_routes())
}

fn product_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::product::list_products,
            handlers::product::upsert_product
        ))
        .routes(routes!(
            handlers::product::get_product,
            handlers::product::update_product,
            handlers::product::delete_product
        ))
        .routes(routes!(handlers::image::add_image))
        .routes(routes!(handlers::image::delete_image))
        .routes(routes!(handlers::service::add_service))
        .routes(routes!(
            handlers::service::update_service,
            handlers::service::delete_service
        ))
        .routes(routes!(handlers::review::add_review))
        .routes(routes!(handlers::review::delete_review))
}
