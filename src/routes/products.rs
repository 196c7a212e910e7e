use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use super::{finish_load, non_empty, page_actions, page_path, row_class, run_mutation, PageChrome};
use crate::error::AppResult;
use crate::resources::drafts::{parse_amount, parse_count};
use crate::resources::{Product, ProductDraft, Resource, ValidationError};
use crate::routes::home::Html;
use crate::state::AppState;
use crate::sync::RowStatus;
use crate::views::{PageEvent, Pagination};

const RESOURCE: Resource = Resource::Products;

// --- View structs ---

pub struct ProductTile {
    pub id: u64,
    pub title: String,
    pub category: String,
    pub brand: String,
    pub price: String,
    pub rating: String,
    pub stock: u64,
    pub thumbnail: String,
    pub row_class: &'static str,
    pub failed: bool,
}

impl ProductTile {
    fn new(product: &Product, status: Option<&RowStatus>) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            category: product.category.clone(),
            brand: product.brand.clone().unwrap_or_default(),
            price: format_price(product.price),
            rating: format!("{:.1}", product.rating),
            stock: product.stock,
            thumbnail: product.thumbnail.clone().unwrap_or_default(),
            row_class: row_class(status),
            failed: status == Some(&RowStatus::Failed),
        }
    }
}

pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/products.html")]
pub struct ProductsTemplate {
    pub chrome: PageChrome,
    pub products: Vec<ProductTile>,
    pub page: usize,
    pub total_pages: usize,
    pub prev_page: Option<usize>,
    pub next_page: Option<usize>,
}

#[derive(Template)]
#[template(path = "pages/product_detail.html")]
pub struct ProductDetailTemplate {
    pub chrome: PageChrome,
    pub product: ProductTile,
    pub description: String,
    pub discount: String,
    /// Only cached products can be edited or deleted.
    pub cached: bool,
}

#[derive(Template)]
#[template(path = "pages/product_form.html")]
pub struct ProductFormTemplate {
    pub chrome: PageChrome,
    pub action: String,
    pub heading: &'static str,
    pub cancel_href: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub brand: String,
    pub stock: String,
}

impl ProductFormTemplate {
    fn new(chrome: PageChrome, action: String, heading: &'static str, draft: &ProductDraft) -> Self {
        Self {
            chrome,
            cancel_href: page_path(RESOURCE).to_string(),
            action,
            heading,
            title: draft.title.clone(),
            description: draft.description.clone(),
            price: if draft.price > 0.0 {
                format!("{:.2}", draft.price)
            } else {
                String::new()
            },
            category: draft.category.clone(),
            brand: draft.brand.clone().unwrap_or_default(),
            stock: draft.stock.to_string(),
        }
    }

    /// Echo a rejected submission back as typed.
    fn resubmit(chrome: PageChrome, action: String, heading: &'static str, form: ProductForm) -> Self {
        Self {
            chrome,
            cancel_href: page_path(RESOURCE).to_string(),
            action,
            heading,
            title: form.title,
            description: form.description,
            price: form.price,
            category: form.category,
            brand: form.brand.unwrap_or_default(),
            stock: form.stock,
        }
    }
}

// --- Forms ---

#[derive(Deserialize, Default)]
pub struct ProductsQuery {
    pub page: Option<usize>,
}

#[derive(Deserialize, Default, Clone)]
#[serde(default)]
pub struct ProductForm {
    pub title: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub brand: Option<String>,
    pub stock: String,
}

impl ProductForm {
    fn draft(&self) -> Result<ProductDraft, ValidationError> {
        Ok(ProductDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price: parse_amount("Price", &self.price)?,
            category: self.category.trim().to_string(),
            brand: non_empty(self.brand.clone()),
            stock: u64::from(parse_count("Stock", &self.stock)?),
        })
    }
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/product", get(products_page).post(create_product))
        .route("/product/new", get(new_product))
        .route("/product/{id}", get(product_detail).post(update_product))
        .route("/product/{id}/edit", get(edit_product))
        .route("/product/{id}/delete", post(delete_product))
        .merge(page_actions::<Product>())
}

async fn chrome(state: &AppState, title: &'static str) -> PageChrome {
    let page = state.pages.state(RESOURCE).await;
    PageChrome {
        path: page_path(RESOURCE),
        title,
        banner: page.banner().map(str::to_string),
        cached_ago: None,
    }
}

// --- Handlers ---

async fn products_page(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> AppResult<Html<ProductsTemplate>> {
    let loaded = state.sync.collection::<Product>().await;
    let (loaded, mut chrome) = finish_load(&state, RESOURCE, "Products", loaded).await;
    let products = match loaded {
        Some(snapshot) => {
            chrome = chrome.with_snapshot_age(&snapshot.saved_at);
            snapshot.records
        }
        None => Vec::new(),
    };

    let pagination = Pagination::new(
        query.page,
        state.config.pages.products_per_page,
        products.len(),
    );
    let flags = state.sync.flags().for_resource(RESOURCE).await;
    let tiles = pagination
        .slice(&products)
        .iter()
        .map(|p| ProductTile::new(p, flags.get(&p.id)))
        .collect();

    Ok(Html(ProductsTemplate {
        chrome,
        products: tiles,
        page: pagination.page,
        total_pages: pagination.total_pages,
        prev_page: pagination.has_prev().then(|| pagination.prev()),
        next_page: pagination.has_next().then(|| pagination.next()),
    }))
}

async fn product_detail(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Html<ProductDetailTemplate>> {
    let found = state.sync.lookup::<Product>(id).await?;
    let cached = found.is_cached();
    let product = found.into_record();
    let status = state.sync.flags().get(RESOURCE, id).await;
    let chrome = chrome(&state, "Product").await;

    Ok(Html(ProductDetailTemplate {
        chrome,
        cached,
        description: product.description.clone(),
        discount: if product.discount_percentage > 0.0 {
            format!("{:.0}% off", product.discount_percentage)
        } else {
            String::new()
        },
        product: ProductTile::new(&product, Some(&status)),
    }))
}

async fn new_product(State(state): State<AppState>) -> Html<ProductFormTemplate> {
    let chrome = chrome(&state, "New product").await;
    Html(ProductFormTemplate::new(
        chrome,
        "/product".to_string(),
        "New product",
        &ProductDraft::default(),
    ))
}

async fn edit_product(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Html<ProductFormTemplate>> {
    let product = state.sync.find::<Product>(id).await?;
    let chrome = chrome(&state, "Edit product").await;
    let mut form = ProductFormTemplate::new(
        chrome,
        format!("/product/{id}"),
        "Edit product",
        &ProductDraft::from(&product),
    );
    form.cancel_href = format!("/product/{id}");
    Ok(Html(form))
}

async fn create_product(State(state): State<AppState>, Form(form): Form<ProductForm>) -> Response {
    let draft = form.draft();
    let created = run_mutation(&state, RESOURCE, PageEvent::Submit, "add", async {
        match draft {
            Ok(draft) => state.sync.create(&draft).await,
            Err(e) => Err(e.into()),
        }
    })
    .await;

    match created {
        Some(product) => Redirect::to(&format!("/product/{}", product.id)).into_response(),
        None => {
            let chrome = chrome(&state, "New product").await;
            Html(ProductFormTemplate::resubmit(
                chrome,
                "/product".to_string(),
                "New product",
                form,
            ))
            .into_response()
        }
    }
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(form): Form<ProductForm>,
) -> Response {
    let draft = form.draft();
    let updated = run_mutation(&state, RESOURCE, PageEvent::Submit, "update", async {
        match draft {
            Ok(draft) => state.sync.update(id, &draft).await,
            Err(e) => Err(e.into()),
        }
    })
    .await;

    match updated {
        Some(_) => Redirect::to(&format!("/product/{id}")).into_response(),
        None => {
            let chrome = chrome(&state, "Edit product").await;
            let mut page = ProductFormTemplate::resubmit(
                chrome,
                format!("/product/{id}"),
                "Edit product",
                form,
            );
            page.cancel_href = format!("/product/{id}");
            Html(page).into_response()
        }
    }
}

async fn delete_product(State(state): State<AppState>, Path(id): Path<u64>) -> Redirect {
    run_mutation(
        &state,
        RESOURCE,
        PageEvent::Delete(id),
        "delete",
        state.sync.delete::<Product>(id),
    )
    .await;
    Redirect::to("/product")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_has_two_decimals() {
        assert_eq!(format_price(9.5), "$9.50");
        assert_eq!(format_price(0.0), "$0.00");
    }

    #[test]
    fn form_parses_numbers() {
        let form = ProductForm {
            title: " Lamp ".into(),
            description: "Bright".into(),
            price: "19.99".into(),
            category: "home".into(),
            brand: Some("".into()),
            stock: "7".into(),
        };
        let draft = form.draft().unwrap();
        assert_eq!(draft.title, "Lamp");
        assert_eq!(draft.price, 19.99);
        assert_eq!(draft.stock, 7);
        assert_eq!(draft.brand, None);
    }

    #[test]
    fn bad_price_is_a_validation_error() {
        let form = ProductForm {
            title: "Lamp".into(),
            price: "-3".into(),
            ..ProductForm::default()
        };
        assert_eq!(
            form.draft().unwrap_err(),
            ValidationError::NotANumber("Price")
        );
    }

    #[test]
    fn rejected_form_is_echoed_as_typed() {
        let form = ProductForm {
            title: "Lamp".into(),
            price: "cheap".into(),
            stock: "3".into(),
            ..ProductForm::default()
        };
        let chrome = PageChrome {
            path: "/product",
            title: "New product",
            banner: Some("Failed to add product: Price must be a number".into()),
            cached_ago: None,
        };
        let page = ProductFormTemplate::resubmit(chrome, "/product".into(), "New product", form);
        assert_eq!(page.title, "Lamp");
        assert_eq!(page.price, "cheap");
        let html = page.render().unwrap();
        assert!(html.contains("value=\"cheap\""));
        assert!(html.contains("Price must be a number"));
    }
}
