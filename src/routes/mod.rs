pub mod assets;
pub mod comments;
pub mod home;
pub mod posts;
pub mod products;
pub mod recipes;
pub mod todos;

use std::future::Future;

use axum::extract::State;
use axum::response::Redirect;
use axum::routing::post;
use axum::Router;
use chrono::{DateTime, Utc};

use crate::resources::{Record, Resource};
use crate::state::AppState;
use crate::sync::{RowStatus, SyncResult};
use crate::views::{format_relative_time, PageEvent};

/// Where each resource's page lives.
pub fn page_path(resource: Resource) -> &'static str {
    match resource {
        Resource::Products => "/product",
        Resource::Recipes => "/recipes",
        Resource::Todos => "/todos",
        Resource::Posts => "/posts",
        Resource::Comments => "/comments",
        Resource::Users => "/",
    }
}

/// Header data shared by every resource page: title, snapshot age and the
/// error banner.
pub struct PageChrome {
    pub path: &'static str,
    pub title: &'static str,
    pub banner: Option<String>,
    pub cached_ago: Option<String>,
}

impl PageChrome {
    pub fn with_snapshot_age(mut self, saved_at: &DateTime<Utc>) -> Self {
        self.cached_ago = Some(format_relative_time(saved_at));
        self
    }
}

/// Record the outcome of a page load on the page board. A failed load still
/// renders the page, with an empty list and the banner.
pub async fn finish_load<T>(
    state: &AppState,
    resource: Resource,
    title: &'static str,
    loaded: SyncResult<T>,
) -> (Option<T>, PageChrome) {
    let value = match loaded {
        Ok(value) => {
            state.pages.apply(resource, PageEvent::Loaded).await;
            Some(value)
        }
        Err(e) => {
            let message = format!("Failed to load {}: {}", resource, e.user_message());
            tracing::warn!(%resource, error = %e, "Page load failed");
            state.pages.apply(resource, PageEvent::Failed(message)).await;
            None
        }
    };

    let page = state.pages.state(resource).await;
    let chrome = PageChrome {
        path: page_path(resource),
        title,
        banner: page.banner().map(str::to_string),
        cached_ago: None,
    };
    (value, chrome)
}

/// Drive one mutation through the page state machine. Failures become the
/// page banner; the caller redirects either way.
pub async fn run_mutation<T, F>(
    state: &AppState,
    resource: Resource,
    event: PageEvent,
    action: &str,
    mutation: F,
) -> Option<T>
where
    F: Future<Output = SyncResult<T>>,
{
    state.pages.apply(resource, event).await;
    match mutation.await {
        Ok(value) => {
            state.pages.apply(resource, PageEvent::Settled).await;
            Some(value)
        }
        Err(e) => {
            let message = format!("Failed to {} {}: {}", action, resource.noun(), e.user_message());
            tracing::warn!(%resource, error = %e, "{}", message);
            state.pages.apply(resource, PageEvent::Failed(message)).await;
            None
        }
    }
}

/// `dismiss` and `refresh` ("Try again") for a resource page.
pub fn page_actions<T: Record>() -> Router<AppState> {
    let path = page_path(T::RESOURCE);
    Router::new()
        .route(&format!("{path}/dismiss"), post(dismiss::<T>))
        .route(&format!("{path}/refresh"), post(refresh::<T>))
}

async fn dismiss<T: Record>(State(state): State<AppState>) -> Redirect {
    let resource = T::RESOURCE;
    state.pages.apply(resource, PageEvent::Dismissed).await;
    Redirect::to(page_path(resource))
}

async fn refresh<T: Record>(State(state): State<AppState>) -> Redirect {
    let resource = T::RESOURCE;
    match state.sync.refresh::<T>().await {
        Ok(_) => {
            state.pages.apply(resource, PageEvent::Dismissed).await;
        }
        Err(e) => {
            let message = format!("Failed to load {}: {}", resource, e.user_message());
            tracing::warn!(%resource, error = %e, "Refresh failed");
            state.pages.apply(resource, PageEvent::Failed(message)).await;
        }
    }
    Redirect::to(page_path(resource))
}

/// Row decoration for a flag.
pub fn row_class(status: Option<&RowStatus>) -> &'static str {
    status.copied().unwrap_or_default().css_class()
}

/// Treat empty optional form fields as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_paths_match_routes() {
        assert_eq!(page_path(Resource::Products), "/product");
        assert_eq!(page_path(Resource::Comments), "/comments");
    }

    #[test]
    fn blank_optional_fields_are_none() {
        assert_eq!(non_empty(Some("   ".into())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(" Chef ".into())), Some("Chef".into()));
    }

    #[test]
    fn row_class_defaults_to_idle() {
        assert_eq!(row_class(None), "");
        assert_eq!(row_class(Some(&RowStatus::Failed)), "row-failed");
    }
}
