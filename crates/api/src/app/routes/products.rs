use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockroom_core::Confirmation;
use stockroom_infra::LedgerError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

// Names travel in request bodies: they may contain '/' ("Taifa 1/2kg").
pub fn router() -> Router {
    Router::new()
        .route("/products", get(list_products).post(add_product))
        .route("/products/names", get(list_names))
        .route("/products/sell", post(sell_product))
        .route("/products/reduce", post(reduce_quantity))
        .route("/products/lower", post(lower_quantity))
        .route("/products/remove", post(remove_product))
}

fn respond(
    services: &AppServices,
    status: StatusCode,
    result: Result<Confirmation, LedgerError>,
) -> axum::response::Response {
    match result {
        Ok(confirmation) => (
            status,
            Json(dto::confirmation_to_json(&confirmation, &services.nouns)),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn add_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AddProductRequest>,
) -> axum::response::Response {
    let result = services
        .ledger
        .add_or_increment(&body.name, body.quantity, body.weight)
        .await;
    respond(&services, StatusCode::CREATED, result)
}

pub async fn sell_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::QuantityRequest>,
) -> axum::response::Response {
    let result = services.ledger.sell(&body.name, body.quantity).await;
    respond(&services, StatusCode::OK, result)
}

pub async fn reduce_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::QuantityRequest>,
) -> axum::response::Response {
    let result = services.ledger.reduce_by(&body.name, body.quantity).await;
    respond(&services, StatusCode::OK, result)
}

pub async fn lower_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::QuantityRequest>,
) -> axum::response::Response {
    let result = services.ledger.lower_to(&body.name, body.quantity).await;
    respond(&services, StatusCode::OK, result)
}

pub async fn remove_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RemoveProductRequest>,
) -> axum::response::Response {
    let result = services.ledger.remove(&body.name).await;
    respond(&services, StatusCode::OK, result)
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.ledger.list_all().await {
        Ok(products) => {
            let items: Vec<_> = products
                .iter()
                .map(|p| dto::product_to_json(p, &services.nouns))
                .collect();
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "count": items.len(),
                    "products": items,
                })),
            )
                .into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn list_names(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.ledger.list_names().await {
        Ok(names) => (StatusCode::OK, Json(serde_json::json!({ "names": names }))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use stockroom_core::UnitNouns;

    use crate::app::{build_app, AppServices};

    async fn app() -> Router {
        build_app(AppServices::in_memory(UnitNouns::default()).await.unwrap())
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let req = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => req
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn add_then_list() {
        let app = app().await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/products",
            Some(json!({ "name": "bakers 25kg", "quantity": 3, "weight": 25.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Product 'Bakers 25kg' (Quantity: 3 bags) added successfully.");
        assert_eq!(body["outcome"]["kind"], "added");

        let (status, body) = call(&app, Method::GET, "/products", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["products"][0]["name"], "Bakers 25kg");
        assert_eq!(body["products"][0]["quantity"], 3);
        assert_eq!(body["products"][0]["weight"], 25.0);
        assert_eq!(body["products"][0]["unit"], "bags");
    }

    #[tokio::test]
    async fn business_errors_map_to_client_statuses() {
        let app = app().await;
        call(&app, Method::POST, "/products", Some(json!({ "name": "flour", "quantity": 2 }))).await;

        let (status, body) = call(&app, Method::POST, "/products", Some(json!({ "name": " ", "quantity": 2 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");

        let (status, body) =
            call(&app, Method::POST, "/products/sell", Some(json!({ "name": "sugar", "quantity": 1 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "product_not_found");

        let (status, body) =
            call(&app, Method::POST, "/products/reduce", Some(json!({ "name": "flour", "quantity": 3 }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "out_of_stock");

        let (status, body) =
            call(&app, Method::POST, "/products/lower", Some(json!({ "name": "flour", "quantity": 9 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn remove_unknown_is_ok() {
        let app = app().await;
        let (status, body) = call(&app, Method::POST, "/products/remove", Some(json!({ "name": "ghost" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["existed"], false);

        let (_, body) = call(&app, Method::GET, "/products/names", None).await;
        assert_eq!(body["names"], json!([]));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = app().await;
        let (status, _) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
