use diesel::prelude::*;
use validator::Validate;

use crate::{
    database::assert,
    error::{AppError, Result},
    models::users::{validate_role, NewUser, User, ROLE_ADMIN},
    schema::{comments, posts, users},
};

pub fn create(conn: &mut SqliteConnection, data: NewUser) -> Result<User> {
    data.validate()?;
    conn.transaction(|conn| {
        if exists_username_or_email(conn, &data.username, &data.email)? {
            return Err(AppError::BadRequest(
                "Username or email already taken".to_string(),
            ));
        }

        let user = diesel::insert_into(users::table)
            .values(&data)
            .returning(User::as_returning())
            .get_result(conn)?;
        Ok(user)
    })
}

pub fn find(conn: &mut SqliteConnection, user_id: i32) -> Result<User> {
    users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound("No such user".to_string()))
}

pub fn find_by_username(conn: &mut SqliteConnection, username: &str) -> Result<Option<User>> {
    Ok(users::table
        .filter(users::username.eq(username))
        .select(User::as_select())
        .first(conn)
        .optional()?)
}

pub fn exists_username_or_email(
    conn: &mut SqliteConnection,
    username: &str,
    email: &str,
) -> Result<bool> {
    let res = users::table
        .filter(users::username.eq(username).or(users::email.eq(email)))
        .count()
        .get_result::<i64>(conn)?;
    Ok(res > 0)
}

pub fn list(conn: &mut SqliteConnection) -> Result<Vec<User>> {
    Ok(users::table
        .select(User::as_select())
        .order(users::username.asc())
        .load(conn)?)
}

pub fn count(conn: &mut SqliteConnection) -> Result<i64> {
    Ok(users::table.count().get_result(conn)?)
}

pub fn set_role(conn: &mut SqliteConnection, user_id: i32, role: &str) -> Result<()> {
    if validate_role(role).is_err() {
        return Err(AppError::BadRequest(format!("Unknown role {}", role)));
    }
    assert::assert_user(conn, user_id)?;

    diesel::update(users::table.find(user_id))
        .set(users::role.eq(role))
        .execute(conn)?;
    Ok(())
}

/// Deletes the account and its comments. Authors of posts are kept.
pub fn delete(conn: &mut SqliteConnection, user_id: i32) -> Result<()> {
    conn.transaction(|conn| {
        assert::assert_user(conn, user_id)?;

        let authored = posts::table
            .filter(posts::author.eq(user_id))
            .count()
            .get_result::<i64>(conn)?;
        if authored > 0 {
            return Err(AppError::BadRequest(
                "User still authors posts".to_string(),
            ));
        }

        diesel::delete(comments::table.filter(comments::author.eq(user_id))).execute(conn)?;
        diesel::delete(users::table.find(user_id)).execute(conn)?;
        Ok(())
    })
}

/// Creates the admin account named by the settings unless it already exists.
pub fn ensure_admin(
    conn: &mut SqliteConnection,
    username: &str,
    email: &str,
    password_hash: String,
) -> Result<bool> {
    if find_by_username(conn, username)?.is_some() {
        return Ok(false);
    }

    create(
        conn,
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: password_hash,
            role: ROLE_ADMIN.to_string(),
            created_at: crate::utils::now_str(),
        },
    )?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        database::test_support,
        models::users::{ROLE_ADMIN, ROLE_USER},
    };

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: "hash".to_string(),
            role: ROLE_USER.to_string(),
            created_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn duplicate_username_or_email_is_rejected() {
        let (_dir, pool) = test_support::pool();
        let mut conn = pool.get().unwrap();
        create(&mut conn, new_user("grace", "grace@example.com")).unwrap();

        let res = create(&mut conn, new_user("grace", "other@example.com"));
        assert!(matches!(res, Err(AppError::BadRequest(_))));
        let res = create(&mut conn, new_user("hopper", "grace@example.com"));
        assert!(matches!(res, Err(AppError::BadRequest(_))));
        assert_eq!(count(&mut conn).unwrap(), 1);
    }

    #[test]
    fn invalid_email_is_a_validation_error() {
        let (_dir, pool) = test_support::pool();
        let mut conn = pool.get().unwrap();
        let res = create(&mut conn, new_user("grace", "not-an-email"));
        assert!(matches!(res, Err(AppError::Validation(_))));
    }

    #[test]
    fn set_role_checks_role_and_user() {
        let (_dir, pool) = test_support::pool();
        let mut conn = pool.get().unwrap();
        let user = create(&mut conn, new_user("grace", "grace@example.com")).unwrap();

        set_role(&mut conn, user.id, ROLE_ADMIN).unwrap();
        assert!(find(&mut conn, user.id).unwrap().is_admin());

        assert!(matches!(
            set_role(&mut conn, user.id, "ROLE_ROOT"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            set_role(&mut conn, user.id + 9, ROLE_USER),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn delete_refuses_post_authors_and_drops_comments() {
        let (_dir, pool) = test_support::pool();
        let mut conn = pool.get().unwrap();
        let author = test_support::user(&mut conn, "author", ROLE_ADMIN);
        let reader = test_support::user(&mut conn, "reader", ROLE_USER);
        let post =
            crate::database::posts::create(&mut conn, test_support::new_post(author.id, "Post"))
                .unwrap();
        crate::database::comments::create(
            &mut conn,
            test_support::new_comment(post.id, reader.id, "hello"),
        )
        .unwrap();

        assert!(matches!(
            delete(&mut conn, author.id),
            Err(AppError::BadRequest(_))
        ));

        delete(&mut conn, reader.id).unwrap();
        assert!(find_by_username(&mut conn, "reader").unwrap().is_none());
        assert_eq!(crate::database::comments::count_pending(&mut conn).unwrap(), 0);
    }

    #[test]
    fn ensure_admin_is_idempotent() {
        let (_dir, pool) = test_support::pool();
        let mut conn = pool.get().unwrap();
        assert!(ensure_admin(&mut conn, "root", "root@example.com", "hash".to_string()).unwrap());
        assert!(!ensure_admin(&mut conn, "root", "root@example.com", "hash".to_string()).unwrap());

        let admin = find_by_username(&mut conn, "root").unwrap().unwrap();
        assert!(admin.is_admin());
    }
}
