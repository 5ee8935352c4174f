use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/packs", pack_routes())
        .nest("/inventory", inventory_routes())
}

fn pack_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::pack::list_pack_types))
        .routes(routes!(handlers::pack::get_supply_stats))
        .routes(routes!(handlers::pack::open_pack))
        .routes(routes!(handlers::pack::get_pack_history))
}

fn inventory_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::inventory::list_inventory))
        .routes(routes!(handlers::inventory::get_collection_stats))
        .routes(routes!(
            handlers::inventory::get_inventory_card,
            handlers::inventory::remove_inventory_card
        ))
}

pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::health::health))
}
