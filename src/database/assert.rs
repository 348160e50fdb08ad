use diesel::prelude::*;

use crate::error::{AppError, Result};

pub fn assert_post(conn: &mut SqliteConnection, post_id: i32) -> Result<()> {
    use crate::schema::posts;

    let res = posts::table
        .filter(posts::id.eq(post_id))
        .count()
        .get_result::<i64>(conn)?;

    if res == 0 {
        return Err(AppError::NotFound("No such post".to_string()));
    }

    Ok(())
}

pub fn assert_comment(conn: &mut SqliteConnection, comment_id: i32) -> Result<()> {
    use crate::schema::comments;

    let res = comments::table
        .filter(comments::id.eq(comment_id))
        .count()
        .get_result::<i64>(conn)?;

    if res == 0 {
        return Err(AppError::NotFound("No such comment".to_string()));
    }

    Ok(())
}

pub fn assert_user(conn: &mut SqliteConnection, user_id: i32) -> Result<()> {
    use crate::schema::users;

    let res = users::table
        .filter(users::id.eq(user_id))
        .count()
        .get_result::<i64>(conn)?;

    if res == 0 {
        return Err(AppError::NotFound("No such user".to_string()));
    }

    Ok(())
}
