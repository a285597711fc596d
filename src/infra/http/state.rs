use std::sync::Arc;

use crate::application::authors::AuthorService;
use crate::application::books::BookService;

use super::auth::RoleResolver;

#[derive(Clone)]
pub struct ApiState {
    pub authors: Arc<AuthorService>,
    pub books: Arc<BookService>,
    pub roles: Arc<RoleResolver>,
}
