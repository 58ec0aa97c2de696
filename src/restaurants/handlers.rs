use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::api::ApiResponse;
use crate::auth::Identity;
use crate::error::ServiceError;
use crate::restaurants::service::{MenuItemRequest, RestaurantRequest, RestaurantService};

// ============================================================================
// Restaurant HTTP Surface
// ============================================================================
//
// Reads are open: they are the upstream the order workflow resolves
// snapshots from, service to service. Mutations require an identity with
// the right role and ownership.
//
// ============================================================================

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/restaurants")
            .route("", web::post().to(create_restaurant))
            .route("", web::get().to(list_restaurants))
            .route("/my", web::get().to(my_restaurants))
            .route("/{restaurant_id}", web::get().to(get_restaurant))
            .route("/{restaurant_id}", web::put().to(update_restaurant))
            .route("/{restaurant_id}", web::delete().to(delete_restaurant))
            .route("/{restaurant_id}/menu-items", web::post().to(create_menu_item))
            .route("/{restaurant_id}/menu-items", web::get().to(list_menu_items))
            .route(
                "/{restaurant_id}/menu-items/{item_id}",
                web::get().to(get_menu_item),
            )
            .route(
                "/{restaurant_id}/menu-items/{item_id}",
                web::put().to(update_menu_item),
            )
            .route(
                "/{restaurant_id}/menu-items/{item_id}",
                web::delete().to(delete_menu_item),
            ),
    );
}

async fn create_restaurant(
    service: web::Data<RestaurantService>,
    identity: Identity,
    request: web::Json<RestaurantRequest>,
) -> Result<HttpResponse, ServiceError> {
    let restaurant = service.create_restaurant(&identity, &request).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Restaurant created successfully.",
        201,
        restaurant,
    )))
}

async fn list_restaurants(
    service: web::Data<RestaurantService>,
) -> Result<HttpResponse, ServiceError> {
    let restaurants = service.list_restaurants().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "All restaurants retrieved successfully.",
        200,
        restaurants,
    )))
}

async fn my_restaurants(
    service: web::Data<RestaurantService>,
    identity: Identity,
) -> Result<HttpResponse, ServiceError> {
    let restaurants = service.my_restaurants(&identity).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Your restaurants retrieved successfully.",
        200,
        restaurants,
    )))
}

async fn get_restaurant(
    service: web::Data<RestaurantService>,
    restaurant_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let restaurant = service.get_restaurant(*restaurant_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Restaurant retrieved successfully.",
        200,
        restaurant,
    )))
}

async fn update_restaurant(
    service: web::Data<RestaurantService>,
    identity: Identity,
    restaurant_id: web::Path<Uuid>,
    request: web::Json<RestaurantRequest>,
) -> Result<HttpResponse, ServiceError> {
    let restaurant = service
        .update_restaurant(&identity, *restaurant_id, &request)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Restaurant updated successfully.",
        200,
        restaurant,
    )))
}

async fn delete_restaurant(
    service: web::Data<RestaurantService>,
    identity: Identity,
    restaurant_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    service.delete_restaurant(&identity, *restaurant_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message_only(
        "Restaurant deleted successfully.",
        200,
    )))
}

async fn create_menu_item(
    service: web::Data<RestaurantService>,
    identity: Identity,
    restaurant_id: web::Path<Uuid>,
    request: web::Json<MenuItemRequest>,
) -> Result<HttpResponse, ServiceError> {
    let item = service
        .create_menu_item(&identity, *restaurant_id, &request)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Menu item created successfully.",
        201,
        item,
    )))
}

async fn list_menu_items(
    service: web::Data<RestaurantService>,
    restaurant_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let items = service.list_menu_items(*restaurant_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Menu items retrieved successfully.",
        200,
        items,
    )))
}

async fn get_menu_item(
    service: web::Data<RestaurantService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ServiceError> {
    let (restaurant_id, item_id) = path.into_inner();
    let item = service.get_menu_item(restaurant_id, item_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Menu item retrieved successfully.",
        200,
        item,
    )))
}

async fn update_menu_item(
    service: web::Data<RestaurantService>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    request: web::Json<MenuItemRequest>,
) -> Result<HttpResponse, ServiceError> {
    let (restaurant_id, item_id) = path.into_inner();
    let item = service
        .update_menu_item(&identity, restaurant_id, item_id, &request)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Menu item updated successfully.",
        200,
        item,
    )))
}

async fn delete_menu_item(
    service: web::Data<RestaurantService>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ServiceError> {
    let (restaurant_id, item_id) = path.into_inner();
    service
        .delete_menu_item(&identity, restaurant_id, item_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message_only(
        "Menu item deleted successfully.",
        200,
    )))
}
