use std::sync::Arc;

use waymate_db::Database;
use waymate_storage::MediaStore;

use crate::ids::TagGenerator;
use crate::mailer::Mailer;

/// Shared application state for all route handlers. Collaborators are
/// injected here rather than reached through globals.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub media: Arc<dyn MediaStore>,
    pub mailer: Arc<dyn Mailer>,
    pub tags: Arc<TagGenerator>,
    pub jwt_secret: String,
}
