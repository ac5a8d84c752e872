use axum::{
    extract::{Query, State},
    http::{HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::json;
use shared::{BookProduct, DvdProduct, FurnitureProduct, NewProduct, Product, ProductType};
use tracing::info;

use crate::db::Db;
use crate::views;

/// Application state containing the storage handle
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
}

impl AppState {
    /// Create new application state with the given storage handle
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

/// Form fields for POST /add. Everything arrives as a string; numeric
/// fields are parsed by the handler so failures become descriptive client
/// errors instead of rejections.
#[derive(Deserialize, Debug)]
pub struct AddProductForm {
    #[serde(rename = "type")]
    pub product_type: String,
    pub sku: String,
    pub name: String,
    pub price: String,
    pub weight: Option<String>,
    pub size: Option<String>,
    pub width: Option<String>,
    pub length: Option<String>,
    pub height: Option<String>,
}

/// Query parameters for GET /templates/form
#[derive(Deserialize, Debug)]
pub struct FormTemplateQuery {
    #[serde(rename = "type")]
    pub product_type: String,
}

fn client_error(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn storage_error(context: &str, err: crate::db::StoreError) -> Response {
    tracing::error!("{context}: {err:?}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

/// Parse a required numeric form field for the given variant.
fn parse_variant_field(
    field: &str,
    raw: Option<&String>,
    product_type: ProductType,
) -> Result<f64, String> {
    let raw = raw.ok_or_else(|| format!("{field} is required for type {product_type}"))?;
    raw.trim()
        .parse::<f64>()
        .map_err(|err| format!("error parsing {field}: {err}"))
}

/// Axum handler function for GET /
pub async fn list_products(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /");

    match state.db.get_all().await {
        Ok(rows) => (StatusCode::OK, Html(views::products_page(&rows))).into_response(),
        Err(e) => {
            tracing::error!("Error listing products: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing products").into_response()
        }
    }
}

/// Axum handler function for GET /add
pub async fn add_product_page() -> impl IntoResponse {
    info!("GET /add");

    (StatusCode::OK, Html(views::add_page()))
}

/// Axum handler function for POST /add
pub async fn create_product(
    State(state): State<AppState>,
    Form(form): Form<AddProductForm>,
) -> Response {
    info!("POST /add - type: {}, sku: {}", form.product_type, form.sku);

    let price = match form.price.trim().parse::<f64>() {
        Ok(price) => price,
        Err(err) => return client_error(format!("error parsing price: {err}")),
    };

    let product_type = match form.product_type.parse::<ProductType>() {
        Ok(product_type) => product_type,
        Err(err) => return client_error(err.to_string()),
    };

    let product = Product {
        sku: form.sku.trim().to_string(),
        name: form.name.trim().to_string(),
        price,
        product_type,
    };

    let variant = match product_type {
        ProductType::Book => {
            let weight = match parse_variant_field("weight", form.weight.as_ref(), product_type) {
                Ok(weight) => weight,
                Err(message) => return client_error(message),
            };
            NewProduct::Book(BookProduct { product, weight })
        }
        ProductType::Dvd => {
            let size = match parse_variant_field("size", form.size.as_ref(), product_type) {
                Ok(size) => size,
                Err(message) => return client_error(message),
            };
            NewProduct::Dvd(DvdProduct { product, size })
        }
        ProductType::Furniture => {
            let width = match parse_variant_field("width", form.width.as_ref(), product_type) {
                Ok(width) => width,
                Err(message) => return client_error(message),
            };
            let length = match parse_variant_field("length", form.length.as_ref(), product_type) {
                Ok(length) => length,
                Err(message) => return client_error(message),
            };
            let height = match parse_variant_field("height", form.height.as_ref(), product_type) {
                Ok(height) => height,
                Err(message) => return client_error(message),
            };
            NewProduct::Furniture(FurnitureProduct {
                product,
                width,
                length,
                height,
            })
        }
    };

    match state.db.insert(&variant).await {
        Ok(()) => {
            // htmx follows HX-Redirect on the client side
            let mut response = StatusCode::CREATED.into_response();
            response
                .headers_mut()
                .insert("HX-Redirect", HeaderValue::from_static("/"));
            response
        }
        Err(err) => storage_error("Error inserting product", err),
    }
}

/// Axum handler function for POST /delete.
///
/// The body carries a repeated `product-id` field, so it is read as raw
/// pairs rather than a struct. Unparsable ids are skipped, matching the
/// lenient behavior the delete form has always had.
pub async fn delete_products(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let ids: Vec<i64> = fields
        .iter()
        .filter(|(key, _)| key == "product-id")
        .filter_map(|(_, value)| value.parse().ok())
        .collect();

    info!("POST /delete - {} ids", ids.len());

    if let Err(err) = state.db.delete_by_ids(&ids).await {
        return storage_error("Error deleting products", err);
    }

    // Return the refreshed grid for the htmx swap
    match state.db.get_all().await {
        Ok(rows) => (StatusCode::OK, Html(views::products_grid(&rows))).into_response(),
        Err(err) => storage_error("Error re-reading products", err),
    }
}

/// Axum handler function for GET /templates/form
pub async fn product_form_fragment(Query(query): Query<FormTemplateQuery>) -> Response {
    info!("GET /templates/form - type: {}", query.product_type);

    match query.product_type.parse::<ProductType>() {
        Ok(product_type) => {
            (StatusCode::OK, Html(views::variant_form(product_type))).into_response()
        }
        Err(err) => client_error(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to create test state backed by a fresh in-memory database
    async fn setup_test_state() -> AppState {
        let db = Db::init_test().await.expect("Failed to create test database");
        AppState::new(db)
    }

    fn book_form(sku: &str, price: &str, weight: Option<&str>) -> AddProductForm {
        AddProductForm {
            product_type: "book".to_string(),
            sku: sku.to_string(),
            name: "Some book".to_string(),
            price: price.to_string(),
            weight: weight.map(str::to_string),
            size: None,
            width: None,
            length: None,
            height: None,
        }
    }

    #[tokio::test]
    async fn test_create_book_redirects_home() {
        let state = setup_test_state().await;

        let response =
            create_product(State(state.clone()), Form(book_form("B1", "9.99", Some("1.5")))).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get("HX-Redirect").map(|v| v.to_str().unwrap()),
            Some("/")
        );

        let rows = state.db.get_all().await.expect("read failed");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sku, "B1");
        assert_eq!(rows[0].weight, Some(1.5));
    }

    #[tokio::test]
    async fn test_create_trims_sku_and_name() {
        let state = setup_test_state().await;

        let mut form = book_form("  B1  ", "9.99", Some("1.5"));
        form.name = " Some book ".to_string();
        let response = create_product(State(state.clone()), Form(form)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let rows = state.db.get_all().await.expect("read failed");
        assert_eq!(rows[0].sku, "B1");
        assert_eq!(rows[0].name, "Some book");
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_type() {
        let state = setup_test_state().await;

        let mut form = book_form("B1", "9.99", Some("1.5"));
        form.product_type = "toaster".to_string();
        let response = create_product(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let rows = state.db.get_all().await.expect("read failed");
        assert!(rows.is_empty(), "Rejected request must not write a row");
    }

    #[tokio::test]
    async fn test_create_rejects_non_numeric_price() {
        let state = setup_test_state().await;

        let response =
            create_product(State(state.clone()), Form(book_form("B1", "abc", Some("1.5")))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let rows = state.db.get_all().await.expect("read failed");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_create_requires_variant_field() {
        let state = setup_test_state().await;

        let response =
            create_product(State(state.clone()), Form(book_form("B1", "9.99", None))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let rows = state.db.get_all().await.expect("read failed");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_create_furniture_round_trip() {
        let state = setup_test_state().await;

        let form = AddProductForm {
            product_type: "furniture".to_string(),
            sku: "F1".to_string(),
            name: "Some table".to_string(),
            price: "120".to_string(),
            weight: None,
            size: None,
            width: Some("3".to_string()),
            length: Some("2".to_string()),
            height: Some("1".to_string()),
        };
        let response = create_product(State(state.clone()), Form(form)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let rows = state.db.get_all().await.expect("read failed");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].width, Some(3.0));
        assert_eq!(rows[0].length, Some(2.0));
        assert_eq!(rows[0].height, Some(1.0));
        assert_eq!(rows[0].weight, None);
    }

    #[tokio::test]
    async fn test_delete_products_skips_unparsable_ids() {
        let state = setup_test_state().await;

        let _ = create_product(
            State(state.clone()),
            Form(book_form("B1", "9.99", Some("1.0"))),
        )
        .await;
        let _ = create_product(
            State(state.clone()),
            Form(book_form("B2", "9.99", Some("2.0"))),
        )
        .await;

        let rows = state.db.get_all().await.expect("read failed");
        let target = rows.iter().find(|r| r.sku == "B1").expect("row missing").id;

        let body = vec![
            ("product-id".to_string(), target.to_string()),
            ("product-id".to_string(), "not-a-number".to_string()),
            ("unrelated".to_string(), "7".to_string()),
        ];
        let response = delete_products(State(state.clone()), Form(body)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let remaining = state.db.get_all().await.expect("read failed");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].sku, "B2");
    }

    #[tokio::test]
    async fn test_delete_with_no_ids_returns_grid_unchanged() {
        let state = setup_test_state().await;

        let _ = create_product(
            State(state.clone()),
            Form(book_form("B1", "9.99", Some("1.0"))),
        )
        .await;

        let response = delete_products(State(state.clone()), Form(vec![])).await;
        assert_eq!(response.status(), StatusCode::OK);

        let rows = state.db.get_all().await.expect("read failed");
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_list_products_on_empty_store() {
        let state = setup_test_state().await;

        let response = list_products(State(state)).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_form_fragment_for_each_known_type() {
        for tag in ["book", "dvd", "furniture"] {
            let query = FormTemplateQuery {
                product_type: tag.to_string(),
            };
            let response = product_form_fragment(Query(query)).await;
            assert_eq!(response.status(), StatusCode::OK, "fragment for {tag}");
        }
    }

    #[tokio::test]
    async fn test_form_fragment_rejects_unknown_type() {
        let query = FormTemplateQuery {
            product_type: "toaster".to_string(),
        };
        let response = product_form_fragment(Query(query)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
