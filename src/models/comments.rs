use crate::schema::comments;
use diesel::prelude::*;
use validator::Validate;

#[derive(Queryable, Selectable, Identifiable, Clone, Debug)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub author: i32,
    pub content: String,
    pub is_validated: bool,
    pub created_at: String,
}

#[derive(Insertable, Validate, Debug)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub post_id: i32,
    pub author: i32,
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
    pub is_validated: bool,
    pub created_at: String,
}

#[derive(Clone, Debug)]
pub struct PublishedComment {
    pub comment: Comment,
    pub author_name: String,
}

#[derive(Clone, Debug)]
pub struct PendingComment {
    pub comment: Comment,
    pub author_name: String,
    pub post_title: String,
}
