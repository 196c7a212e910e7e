use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::Config;
use crate::resources::RecipeDraft;
use crate::sync::ResourceSync;
use crate::views::{DraftEditor, PageBoard};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sync: Arc<ResourceSync>,
    pub pages: PageBoard,
    pub recipe_editor: DraftEditor<RecipeDraft>,
}

impl AppState {
    pub fn new(config: Config, sync: ResourceSync) -> Self {
        Self {
            config,
            sync: Arc::new(sync),
            pages: PageBoard::new(),
            recipe_editor: DraftEditor::new(),
        }
    }
}
