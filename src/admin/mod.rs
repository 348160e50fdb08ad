mod requests;

use actix_web::{get, http::StatusCode, post, web, HttpResponse};
use validator::Validate;

use crate::{
    auth::utils::CurrentUser,
    database::{self, comments, posts, users},
    error::{AppError, Result},
    models::posts::{NewPost, UpdatePost},
    protocol::redirect,
    session::{csrf, Session, FLASH_SUCCESS},
    views::{
        self,
        admin::{CommentsPage, DashboardPage, PostFormPage, PostsPage, UsersPage},
        PageContext,
    },
    DbPool,
};

use self::requests::*;

const MODERATION_TOKEN: &str = "comment_moderation_token";
const POST_TOKEN: &str = "post_token";
const USER_TOKEN: &str = "user_token";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard)
        .service(list_comments)
        .service(validate_comment)
        .service(delete_comment)
        .service(list_posts)
        .service(new_post_form)
        .service(create_post)
        .service(edit_post_form)
        .service(update_post)
        .service(delete_post)
        .service(list_users)
        .service(change_role)
        .service(delete_user);
}

fn page_context(session: &Session, admin: CurrentUser) -> PageContext {
    PageContext::new(session, Some(admin.0))
}

#[get("")]
async fn dashboard(
    pool: web::Data<DbPool>,
    session: Session,
    admin: CurrentUser,
) -> Result<HttpResponse> {
    let page = database::run(&pool, |conn| {
        Ok(DashboardPage {
            posts: posts::count(conn)?,
            users: users::count(conn)?,
            pending_comments: comments::count_pending(conn)?,
        })
    })
    .await?;

    Ok(views::render(
        &page,
        &page_context(&session, admin),
        StatusCode::OK,
    ))
}

#[get("/comments")]
async fn list_comments(
    pool: web::Data<DbPool>,
    session: Session,
    admin: CurrentUser,
) -> Result<HttpResponse> {
    let pending = database::run(&pool, comments::list_pending).await?;
    let page = CommentsPage {
        pending,
        csrf_token: csrf::token(&session, MODERATION_TOKEN)?,
    };
    Ok(views::render(
        &page,
        &page_context(&session, admin),
        StatusCode::OK,
    ))
}

#[post("/comments/{id}/validate")]
async fn validate_comment(
    pool: web::Data<DbPool>,
    session: Session,
    admin: CurrentUser,
    path: web::Path<i32>,
    form: web::Form<ModerationRequest>,
) -> Result<HttpResponse> {
    csrf::verify(&session, MODERATION_TOKEN, &form.comment_moderation_token)?;

    let comment_id = path.into_inner();
    database::run(&pool, move |conn| comments::validate(conn, comment_id)).await?;
    tracing::info!(comment_id, admin_id = admin.0.id, "comment approved");

    session.add_flash(FLASH_SUCCESS, "Comment approved.")?;
    Ok(redirect("/admin/comments"))
}

#[post("/comments/{id}/delete")]
async fn delete_comment(
    pool: web::Data<DbPool>,
    session: Session,
    admin: CurrentUser,
    path: web::Path<i32>,
    form: web::Form<ModerationRequest>,
) -> Result<HttpResponse> {
    csrf::verify(&session, MODERATION_TOKEN, &form.comment_moderation_token)?;

    let comment_id = path.into_inner();
    database::run(&pool, move |conn| comments::delete(conn, comment_id)).await?;
    tracing::info!(comment_id, admin_id = admin.0.id, "comment deleted");

    session.add_flash(FLASH_SUCCESS, "Comment deleted.")?;
    Ok(redirect("/admin/comments"))
}

#[get("/posts")]
async fn list_posts(
    pool: web::Data<DbPool>,
    session: Session,
    admin: CurrentUser,
) -> Result<HttpResponse> {
    let posts = database::run(&pool, |conn| {
        let total = posts::count(conn)?;
        posts::list(conn, 0, total)
    })
    .await?;

    let page = PostsPage {
        posts,
        csrf_token: csrf::token(&session, POST_TOKEN)?,
    };
    Ok(views::render(
        &page,
        &page_context(&session, admin),
        StatusCode::OK,
    ))
}

#[get("/posts/new")]
async fn new_post_form(session: Session, admin: CurrentUser) -> Result<HttpResponse> {
    let page = PostFormPage {
        heading: "New post".to_string(),
        action: "/admin/posts/new".to_string(),
        csrf_token: csrf::token(&session, POST_TOKEN)?,
        ..Default::default()
    };
    Ok(views::render(
        &page,
        &page_context(&session, admin),
        StatusCode::OK,
    ))
}

fn invalid_post_form(
    session: &Session,
    admin: CurrentUser,
    heading: &str,
    action: String,
    form: PostRequest,
    errors: Vec<String>,
) -> Result<HttpResponse> {
    let page = PostFormPage {
        heading: heading.to_string(),
        action,
        title: form.title,
        lede: form.lede,
        content: form.content,
        errors,
        csrf_token: csrf::token(session, POST_TOKEN)?,
    };
    Ok(views::render(
        &page,
        &page_context(session, admin),
        StatusCode::BAD_REQUEST,
    ))
}

#[post("/posts/new")]
async fn create_post(
    pool: web::Data<DbPool>,
    session: Session,
    admin: CurrentUser,
    form: web::Form<PostRequest>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    csrf::verify(&session, POST_TOKEN, &form.post_token)?;

    if let Err(errors) = form.validate() {
        let errors = views::violations(&errors);
        return invalid_post_form(
            &session,
            admin,
            "New post",
            "/admin/posts/new".to_string(),
            form,
            errors,
        );
    }

    let now = crate::utils::now_str();
    let data = NewPost {
        title: form.title,
        lede: form.lede,
        content: form.content,
        author: admin.0.id,
        created_at: now.clone(),
        updated_at: now,
    };
    let post = database::run(&pool, move |conn| posts::create(conn, data)).await?;
    tracing::info!(post_id = post.id, admin_id = admin.0.id, "post created");

    session.add_flash(FLASH_SUCCESS, format!("Post \"{}\" published.", post.title))?;
    Ok(redirect("/admin/posts"))
}

#[get("/posts/{id}/edit")]
async fn edit_post_form(
    pool: web::Data<DbPool>,
    session: Session,
    admin: CurrentUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let post_id = path.into_inner();
    let post = database::run(&pool, move |conn| posts::find(conn, post_id)).await?;

    let page = PostFormPage {
        heading: "Edit post".to_string(),
        action: format!("/admin/posts/{}/edit", post.id),
        title: post.title,
        lede: post.lede,
        content: post.content,
        errors: Vec::new(),
        csrf_token: csrf::token(&session, POST_TOKEN)?,
    };
    Ok(views::render(
        &page,
        &page_context(&session, admin),
        StatusCode::OK,
    ))
}

#[post("/posts/{id}/edit")]
async fn update_post(
    pool: web::Data<DbPool>,
    session: Session,
    admin: CurrentUser,
    path: web::Path<i32>,
    form: web::Form<PostRequest>,
) -> Result<HttpResponse> {
    let post_id = path.into_inner();
    let form = form.into_inner();
    csrf::verify(&session, POST_TOKEN, &form.post_token)?;

    if let Err(errors) = form.validate() {
        let errors = views::violations(&errors);
        return invalid_post_form(
            &session,
            admin,
            "Edit post",
            format!("/admin/posts/{}/edit", post_id),
            form,
            errors,
        );
    }

    let data = UpdatePost {
        title: form.title,
        lede: form.lede,
        content: form.content,
        updated_at: crate::utils::now_str(),
    };
    let post = database::run(&pool, move |conn| posts::update(conn, post_id, data)).await?;
    tracing::info!(post_id = post.id, admin_id = admin.0.id, "post updated");

    session.add_flash(FLASH_SUCCESS, format!("Post \"{}\" updated.", post.title))?;
    Ok(redirect("/admin/posts"))
}

#[post("/posts/{id}/delete")]
async fn delete_post(
    pool: web::Data<DbPool>,
    session: Session,
    admin: CurrentUser,
    path: web::Path<i32>,
    form: web::Form<PostTokenRequest>,
) -> Result<HttpResponse> {
    csrf::verify(&session, POST_TOKEN, &form.post_token)?;

    let post_id = path.into_inner();
    database::run(&pool, move |conn| posts::delete(conn, post_id)).await?;
    tracing::info!(post_id, admin_id = admin.0.id, "post deleted");

    session.add_flash(FLASH_SUCCESS, "Post deleted.")?;
    Ok(redirect("/admin/posts"))
}

#[get("/users")]
async fn list_users(
    pool: web::Data<DbPool>,
    session: Session,
    admin: CurrentUser,
) -> Result<HttpResponse> {
    let users = database::run(&pool, users::list).await?;
    let page = UsersPage {
        users,
        current_user_id: admin.0.id,
        csrf_token: csrf::token(&session, USER_TOKEN)?,
    };
    Ok(views::render(
        &page,
        &page_context(&session, admin),
        StatusCode::OK,
    ))
}

#[post("/users/{id}/role")]
async fn change_role(
    pool: web::Data<DbPool>,
    session: Session,
    admin: CurrentUser,
    path: web::Path<i32>,
    form: web::Form<UserRoleRequest>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    csrf::verify(&session, USER_TOKEN, &form.user_token)?;

    let user_id = path.into_inner();
    if user_id == admin.0.id {
        return Err(AppError::BadRequest(
            "You cannot change your own role".to_string(),
        ));
    }

    let role = form.role;
    let new_role = role.clone();
    database::run(&pool, move |conn| users::set_role(conn, user_id, &new_role)).await?;
    tracing::info!(user_id, role = %role, admin_id = admin.0.id, "role changed");

    session.add_flash(FLASH_SUCCESS, "Role updated.")?;
    Ok(redirect("/admin/users"))
}

#[post("/users/{id}/delete")]
async fn delete_user(
    pool: web::Data<DbPool>,
    session: Session,
    admin: CurrentUser,
    path: web::Path<i32>,
    form: web::Form<UserTokenRequest>,
) -> Result<HttpResponse> {
    csrf::verify(&session, USER_TOKEN, &form.user_token)?;

    let user_id = path.into_inner();
    if user_id == admin.0.id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    database::run(&pool, move |conn| users::delete(conn, user_id)).await?;
    tracing::info!(user_id, admin_id = admin.0.id, "user deleted");

    session.add_flash(FLASH_SUCCESS, "User deleted.")?;
    Ok(redirect("/admin/users"))
}
