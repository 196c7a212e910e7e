use askama::Template;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use super::page_path;
use crate::resources::Resource;

pub struct FeatureCard {
    pub title: &'static str,
    pub href: &'static str,
    pub blurb: &'static str,
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub cards: Vec<FeatureCard>,
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

fn feature_cards() -> Vec<FeatureCard> {
    vec![
        FeatureCard {
            title: "Products",
            href: page_path(Resource::Products),
            blurb: "Browse the catalogue, open a product and add or edit items.",
        },
        FeatureCard {
            title: "Recipes",
            href: page_path(Resource::Recipes),
            blurb: "Ingredients, steps and timings, with a full recipe editor.",
        },
        FeatureCard {
            title: "Todos",
            href: page_path(Resource::Todos),
            blurb: "Assign tasks, tick them off and filter what is left.",
        },
        FeatureCard {
            title: "Posts",
            href: page_path(Resource::Posts),
            blurb: "Write posts with tags and see their reactions.",
        },
        FeatureCard {
            title: "Comments",
            href: page_path(Resource::Comments),
            blurb: "Search and page through comments, edit them in place.",
        },
    ]
}

pub async fn index() -> Html<HomeTemplate> {
    Html(HomeTemplate {
        cards: feature_cards(),
    })
}
