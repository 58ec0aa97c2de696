use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::ApiResponse;
use crate::auth::Identity;
use crate::error::ServiceError;
use crate::orders::service::{OrderRequest, OrderService, OrderStatusUpdateRequest};

// ============================================================================
// Order HTTP Surface
// ============================================================================

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/orders")
            .route("", web::post().to(create_order))
            .route("", web::get().to(list_orders))
            .route("/restaurant/{restaurant_id}", web::get().to(orders_for_restaurant))
            .route("/{order_id}", web::get().to(get_order))
            .route("/{order_id}/status", web::put().to(update_status))
            .route("/{order_id}", web::delete().to(cancel_order)),
    );
}

#[derive(Debug, Deserialize)]
struct OrderListQuery {
    user: Option<String>,
}

async fn create_order(
    service: web::Data<OrderService>,
    identity: Identity,
    request: web::Json<OrderRequest>,
) -> Result<HttpResponse, ServiceError> {
    let order = service.create_order(&identity, &request).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Order created successfully",
        201,
        order.id,
    )))
}

async fn get_order(
    service: web::Data<OrderService>,
    identity: Identity,
    order_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let order = service.get_order(&identity, *order_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Order retrieved successfully",
        200,
        order,
    )))
}

async fn list_orders(
    service: web::Data<OrderService>,
    identity: Identity,
    query: web::Query<OrderListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let orders = service
        .orders_for_user(&identity, query.user.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Orders retrieved successfully",
        200,
        orders,
    )))
}

async fn orders_for_restaurant(
    service: web::Data<OrderService>,
    identity: Identity,
    restaurant_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let orders = service
        .orders_for_restaurant(&identity, *restaurant_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Orders retrieved for restaurant successfully",
        200,
        orders,
    )))
}

async fn update_status(
    service: web::Data<OrderService>,
    identity: Identity,
    order_id: web::Path<Uuid>,
    request: web::Json<OrderStatusUpdateRequest>,
) -> Result<HttpResponse, ServiceError> {
    let updated = service
        .update_status(&identity, *order_id, request.new_status)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Order status updated successfully",
        200,
        updated,
    )))
}

async fn cancel_order(
    service: web::Data<OrderService>,
    identity: Identity,
    order_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    service.cancel(&identity, *order_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message_only(
        "Order cancelled successfully",
        200,
    )))
}
