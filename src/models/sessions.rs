use crate::schema::sessions;
use diesel::prelude::*;

#[derive(Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SessionData {
    pub id: String,
    pub data: String,
    pub updated_at: String,
}
