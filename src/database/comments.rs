use diesel::prelude::*;
use validator::Validate;

use crate::{
    database::assert,
    error::Result,
    models::comments::{Comment, NewComment, PendingComment, PublishedComment},
    schema::{comments, posts, users},
};

pub fn create(conn: &mut SqliteConnection, data: NewComment) -> Result<Comment> {
    data.validate()?;
    assert::assert_post(conn, data.post_id)?;
    assert::assert_user(conn, data.author)?;

    let comment = diesel::insert_into(comments::table)
        .values(&data)
        .returning(Comment::as_returning())
        .get_result(conn)?;
    Ok(comment)
}

pub fn list_validated_for_post(
    conn: &mut SqliteConnection,
    post_id: i32,
) -> Result<Vec<PublishedComment>> {
    let rows = comments::table
        .inner_join(users::table.on(users::id.eq(comments::author)))
        .filter(comments::post_id.eq(post_id))
        .filter(comments::is_validated.eq(true))
        .select((Comment::as_select(), users::username))
        .order((comments::created_at.asc(), comments::id.asc()))
        .load::<(Comment, String)>(conn)?;

    Ok(rows
        .into_iter()
        .map(|(comment, author_name)| PublishedComment {
            comment,
            author_name,
        })
        .collect())
}

pub fn list_pending(conn: &mut SqliteConnection) -> Result<Vec<PendingComment>> {
    let rows = comments::table
        .inner_join(posts::table)
        .inner_join(users::table.on(users::id.eq(comments::author)))
        .filter(comments::is_validated.eq(false))
        .select((Comment::as_select(), users::username, posts::title))
        .order((comments::created_at.asc(), comments::id.asc()))
        .load::<(Comment, String, String)>(conn)?;

    Ok(rows
        .into_iter()
        .map(|(comment, author_name, post_title)| PendingComment {
            comment,
            author_name,
            post_title,
        })
        .collect())
}

pub fn count_pending(conn: &mut SqliteConnection) -> Result<i64> {
    Ok(comments::table
        .filter(comments::is_validated.eq(false))
        .count()
        .get_result(conn)?)
}

pub fn validate(conn: &mut SqliteConnection, comment_id: i32) -> Result<()> {
    assert::assert_comment(conn, comment_id)?;
    diesel::update(comments::table.find(comment_id))
        .set(comments::is_validated.eq(true))
        .execute(conn)?;
    Ok(())
}

pub fn delete(conn: &mut SqliteConnection, comment_id: i32) -> Result<()> {
    assert::assert_comment(conn, comment_id)?;
    diesel::delete(comments::table.find(comment_id)).execute(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{database::test_support, error::AppError, models::users::ROLE_USER};

    #[test]
    fn new_comments_wait_for_moderation() {
        let (_dir, pool) = test_support::pool();
        let mut conn = pool.get().unwrap();
        let reader = test_support::user(&mut conn, "reader", ROLE_USER);
        let post =
            crate::database::posts::create(&mut conn, test_support::new_post(reader.id, "Post"))
                .unwrap();

        let comment =
            create(&mut conn, test_support::new_comment(post.id, reader.id, "Nice")).unwrap();
        assert!(!comment.is_validated);
        assert!(list_validated_for_post(&mut conn, post.id).unwrap().is_empty());
        assert_eq!(count_pending(&mut conn).unwrap(), 1);

        let pending = list_pending(&mut conn).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].author_name, "reader");
        assert_eq!(pending[0].post_title, "Post");

        validate(&mut conn, comment.id).unwrap();
        let published = list_validated_for_post(&mut conn, post.id).unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].comment.content, "Nice");
        assert_eq!(count_pending(&mut conn).unwrap(), 0);
    }

    #[test]
    fn empty_comment_is_rejected() {
        let (_dir, pool) = test_support::pool();
        let mut conn = pool.get().unwrap();
        let reader = test_support::user(&mut conn, "reader", ROLE_USER);
        let post =
            crate::database::posts::create(&mut conn, test_support::new_post(reader.id, "Post"))
                .unwrap();

        let res = create(&mut conn, test_support::new_comment(post.id, reader.id, ""));
        assert!(matches!(res, Err(AppError::Validation(_))));

        let res = create(&mut conn, test_support::new_comment(post.id + 1, reader.id, "Hi"));
        assert!(matches!(res, Err(AppError::NotFound(_))));
    }

    #[test]
    fn moderation_of_unknown_comment_is_not_found() {
        let (_dir, pool) = test_support::pool();
        let mut conn = pool.get().unwrap();
        assert!(matches!(validate(&mut conn, 7), Err(AppError::NotFound(_))));
        assert!(matches!(delete(&mut conn, 7), Err(AppError::NotFound(_))));
    }
}
