use diesel::prelude::*;
use validator::Validate;

use crate::{
    database::assert,
    error::{AppError, Result},
    models::posts::{NewPost, Post, PostWithAuthor, UpdatePost},
    schema::{comments, posts, users},
};

pub fn create(conn: &mut SqliteConnection, data: NewPost) -> Result<Post> {
    data.validate()?;
    assert::assert_user(conn, data.author)?;

    let post = diesel::insert_into(posts::table)
        .values(&data)
        .returning(Post::as_returning())
        .get_result(conn)?;
    Ok(post)
}

pub fn find(conn: &mut SqliteConnection, post_id: i32) -> Result<Post> {
    posts::table
        .find(post_id)
        .select(Post::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound("No such post".to_string()))
}

pub fn find_with_author(conn: &mut SqliteConnection, post_id: i32) -> Result<PostWithAuthor> {
    posts::table
        .inner_join(users::table)
        .filter(posts::id.eq(post_id))
        .select((Post::as_select(), users::username))
        .first::<(Post, String)>(conn)
        .optional()?
        .map(|(post, author_name)| PostWithAuthor { post, author_name })
        .ok_or_else(|| AppError::NotFound("No such post".to_string()))
}

pub fn list(conn: &mut SqliteConnection, first_index: i64, limit: i64) -> Result<Vec<PostWithAuthor>> {
    let rows = posts::table
        .inner_join(users::table)
        .select((Post::as_select(), users::username))
        .order((posts::created_at.desc(), posts::id.desc()))
        .offset(first_index.max(0))
        .limit(limit.max(0))
        .load::<(Post, String)>(conn)?;

    Ok(rows
        .into_iter()
        .map(|(post, author_name)| PostWithAuthor { post, author_name })
        .collect())
}

pub fn latest(conn: &mut SqliteConnection, n: i64) -> Result<Vec<PostWithAuthor>> {
    list(conn, 0, n)
}

pub fn count(conn: &mut SqliteConnection) -> Result<i64> {
    Ok(posts::table.count().get_result(conn)?)
}

pub fn update(conn: &mut SqliteConnection, post_id: i32, data: UpdatePost) -> Result<Post> {
    data.validate()?;
    assert::assert_post(conn, post_id)?;

    let post = diesel::update(posts::table.find(post_id))
        .set(&data)
        .returning(Post::as_returning())
        .get_result(conn)?;
    Ok(post)
}

/// Deletes the post together with its comments.
pub fn delete(conn: &mut SqliteConnection, post_id: i32) -> Result<()> {
    conn.transaction(|conn| {
        assert::assert_post(conn, post_id)?;
        diesel::delete(comments::table.filter(comments::post_id.eq(post_id))).execute(conn)?;
        diesel::delete(posts::table.find(post_id)).execute(conn)?;
        Ok(())
    })
}
