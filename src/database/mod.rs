pub mod assert;
pub mod comments;
pub mod posts;
pub mod sessions;
pub mod users;

use crate::{error::AppError, DbPool};
use actix_web::web;
use anyhow::Context;
use diesel::{
    connection::SimpleConnection,
    r2d2::{ConnectionManager, CustomizeConnection},
    SqliteConnection,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, Clone, Copy)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn create_pool(database_url: &str, max_size: u32) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)
        .context("Failed to create pool")
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get().context("DB connection")?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| anyhow::anyhow!("migration failed: {}", err))?;
    for version in applied {
        tracing::info!(%version, "applied migration");
    }
    Ok(())
}

/// Runs `f` on the blocking pool with a pooled connection.
pub async fn run<F, R>(pool: &web::Data<DbPool>, f: F) -> Result<R, AppError>
where
    F: FnOnce(&mut SqliteConnection) -> Result<R, AppError> + Send + 'static,
    R: Send + 'static,
{
    let pool = pool.clone();
    web::block(move || {
        let mut conn = pool.get().context("DB connection")?;
        f(&mut conn)
    })
    .await?
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::{comments::NewComment, posts::NewPost, users::NewUser, users::User};
    use diesel::prelude::*;
    use tempfile::TempDir;

    pub fn pool() -> (TempDir, DbPool) {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("test.db");
        let pool = create_pool(url.to_str().unwrap(), 2).unwrap();
        run_migrations(&pool).unwrap();
        (dir, pool)
    }

    pub fn user(conn: &mut SqliteConnection, username: &str, role: &str) -> User {
        diesel::insert_into(crate::schema::users::table)
            .values(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: "not-a-real-hash".to_string(),
                role: role.to_string(),
                created_at: "2024-01-01 00:00:00".to_string(),
            })
            .returning(User::as_returning())
            .get_result(conn)
            .unwrap()
    }

    pub fn new_post(author: i32, title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            lede: format!("Lede of {}", title),
            content: format!("Body of {}", title),
            author,
            created_at: "2024-01-01 12:00:00".to_string(),
            updated_at: "2024-01-01 12:00:00".to_string(),
        }
    }

    pub fn new_comment(post_id: i32, author: i32, content: &str) -> NewComment {
        NewComment {
            post_id,
            author,
            content: content.to_string(),
            is_validated: false,
            created_at: "2024-01-02 08:00:00".to_string(),
        }
    }
}
