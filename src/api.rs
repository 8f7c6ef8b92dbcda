//! JSON HTTP surface for the item record service
//!
//! Routes and status codes match what the frontend consumes: POST/GET
//! `/items`, PUT/DELETE `/items/:itemId`, plus a health probe. CORS permits
//! any origin.

use crate::core::item::Item;
use crate::service::{ItemPatch, ItemService, NewItem, ServiceError};
use chrono::{DateTime, Utc};
use poem::http::Method;
use poem::middleware::Cors;
use poem::{Endpoint, EndpointExt, Route};
use poem_openapi::param::{Path, Query};
use poem_openapi::payload::Json;
use poem_openapi::{ApiResponse, Object, OpenApi, OpenApiService};
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Object)]
#[oai(rename_all = "camelCase")]
struct CreateItemRequest {
    user_id: Option<String>,
    name: Option<String>,
    url: Option<String>,
    price: Option<f64>,
    sales_tax_rate: Option<f64>,
    target_years: Option<u32>,
    expected_return: Option<f64>,
}

#[derive(Debug, Object)]
#[oai(rename_all = "camelCase")]
struct UpdateItemRequest {
    name: Option<String>,
    url: Option<String>,
    price: Option<f64>,
    target_years: Option<u32>,
    expected_return: Option<f64>,
}

#[derive(Debug, Object)]
struct ErrorBody {
    error: String,
    #[oai(skip_serializing_if_is_none)]
    message: Option<String>,
}

impl ErrorBody {
    fn validation(message: String) -> Self {
        ErrorBody {
            error: message,
            message: None,
        }
    }

    fn not_found() -> Self {
        ErrorBody {
            error: "Item not found".to_string(),
            message: None,
        }
    }

    fn internal(err: &anyhow::Error) -> Self {
        ErrorBody {
            error: "Internal server error".to_string(),
            message: Some(err.to_string()),
        }
    }
}

#[derive(Debug, Object)]
#[oai(rename_all = "camelCase")]
struct DeletedBody {
    message: String,
    item_id: String,
}

#[derive(Debug, Object)]
struct HealthBody {
    status: String,
    timestamp: DateTime<Utc>,
}

#[derive(ApiResponse)]
enum CreateItemResponse {
    #[oai(status = 201)]
    Created(Json<Item>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorBody>),
    #[oai(status = 500)]
    Internal(Json<ErrorBody>),
}

#[derive(ApiResponse)]
enum ListItemsResponse {
    #[oai(status = 200)]
    Ok(Json<Vec<Item>>),
    #[oai(status = 500)]
    Internal(Json<ErrorBody>),
}

#[derive(ApiResponse)]
enum UpdateItemResponse {
    #[oai(status = 200)]
    Ok(Json<Item>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorBody>),
    #[oai(status = 404)]
    NotFound(Json<ErrorBody>),
    #[oai(status = 500)]
    Internal(Json<ErrorBody>),
}

#[derive(ApiResponse)]
enum DeleteItemResponse {
    #[oai(status = 200)]
    Ok(Json<DeletedBody>),
    #[oai(status = 404)]
    NotFound(Json<ErrorBody>),
    #[oai(status = 500)]
    Internal(Json<ErrorBody>),
}

pub struct Api {
    service: Arc<ItemService>,
}

#[OpenApi]
impl Api {
    #[oai(path = "/items", method = "post")]
    async fn create_item(&self, body: Json<CreateItemRequest>) -> CreateItemResponse {
        let Json(body) = body;

        let Some(url) = body.url.filter(|u| !u.is_empty()) else {
            return CreateItemResponse::BadRequest(Json(ErrorBody::validation(
                "Missing required field: url".to_string(),
            )));
        };
        let Some(price) = body.price else {
            return CreateItemResponse::BadRequest(Json(ErrorBody::validation(
                "Missing required field: price".to_string(),
            )));
        };

        let draft = NewItem {
            user_id: body.user_id,
            name: body.name,
            url,
            price,
            sales_tax_rate: body.sales_tax_rate,
            target_years: body.target_years,
            expected_return: body.expected_return,
        };

        match self.service.create(draft).await {
            Ok(item) => CreateItemResponse::Created(Json(item)),
            Err(ServiceError::Validation(message)) => {
                CreateItemResponse::BadRequest(Json(ErrorBody::validation(message)))
            }
            Err(ServiceError::NotFound) => CreateItemResponse::BadRequest(Json(
                ErrorBody::validation("Invalid request".to_string()),
            )),
            Err(ServiceError::Storage(err)) => {
                error!(error = %err, "Create failed");
                CreateItemResponse::Internal(Json(ErrorBody::internal(&err)))
            }
        }
    }

    #[oai(path = "/items", method = "get")]
    async fn list_items(
        &self,
        #[oai(name = "userId")] user_id: Query<Option<String>>,
    ) -> ListItemsResponse {
        let user_id = self.service.resolve_user(user_id.0);
        match self.service.list(&user_id).await {
            Ok(items) => ListItemsResponse::Ok(Json(items)),
            Err(ServiceError::Storage(err)) => {
                error!(error = %err, "List failed");
                ListItemsResponse::Internal(Json(ErrorBody::internal(&err)))
            }
            Err(err) => {
                error!(error = %err, "List failed");
                ListItemsResponse::Internal(Json(ErrorBody::internal(&err.into())))
            }
        }
    }

    #[oai(path = "/items/:item_id", method = "put")]
    async fn update_item(
        &self,
        item_id: Path<String>,
        #[oai(name = "userId")] user_id: Query<Option<String>>,
        body: Json<UpdateItemRequest>,
    ) -> UpdateItemResponse {
        let user_id = self.service.resolve_user(user_id.0);
        let Json(body) = body;
        let patch = ItemPatch {
            name: body.name,
            url: body.url,
            price: body.price,
            target_years: body.target_years,
            expected_return: body.expected_return,
        };

        match self.service.update(&user_id, &item_id.0, patch).await {
            Ok(item) => UpdateItemResponse::Ok(Json(item)),
            Err(ServiceError::Validation(message)) => {
                UpdateItemResponse::BadRequest(Json(ErrorBody::validation(message)))
            }
            Err(ServiceError::NotFound) => {
                UpdateItemResponse::NotFound(Json(ErrorBody::not_found()))
            }
            Err(ServiceError::Storage(err)) => {
                error!(error = %err, "Update failed");
                UpdateItemResponse::Internal(Json(ErrorBody::internal(&err)))
            }
        }
    }

    #[oai(path = "/items/:item_id", method = "delete")]
    async fn delete_item(
        &self,
        item_id: Path<String>,
        #[oai(name = "userId")] user_id: Query<Option<String>>,
    ) -> DeleteItemResponse {
        let user_id = self.service.resolve_user(user_id.0);
        match self.service.delete(&user_id, &item_id.0).await {
            Ok(()) => DeleteItemResponse::Ok(Json(DeletedBody {
                message: "Item deleted successfully".to_string(),
                item_id: item_id.0,
            })),
            Err(ServiceError::NotFound) => {
                DeleteItemResponse::NotFound(Json(ErrorBody::not_found()))
            }
            Err(err) => {
                error!(error = %err, "Delete failed");
                DeleteItemResponse::Internal(Json(ErrorBody::internal(&err.into())))
            }
        }
    }

    #[oai(path = "/health", method = "get")]
    async fn health(&self) -> Json<HealthBody> {
        Json(HealthBody {
            status: "ok".to_string(),
            timestamp: Utc::now(),
        })
    }
}

/// Builds the routed application with permissive CORS, ready to serve.
pub fn build_app(service: Arc<ItemService>) -> impl Endpoint {
    let api_service = OpenApiService::new(
        Api { service },
        "wishvest",
        env!("CARGO_PKG_VERSION"),
    );

    let cors = Cors::new()
        .allow_method(Method::GET)
        .allow_method(Method::POST)
        .allow_method(Method::PUT)
        .allow_method(Method::DELETE)
        .allow_method(Method::OPTIONS);

    Route::new().nest("/", api_service).with(cors)
}
