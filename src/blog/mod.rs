mod requests;

use actix_web::{get, http::StatusCode, post, web, HttpResponse};
use validator::Validate;

use crate::{
    auth::utils::CurrentUser,
    database::{self, comments, posts},
    error::Result,
    models::comments::NewComment,
    protocol::{redirect, PageQuery, Pagination, POSTS_PER_PAGE},
    session::{csrf, Session, FLASH_SUCCESS},
    views::{
        self,
        blog::{CommentForm, PostListPage, PostPage},
        PageContext,
    },
    DbPool,
};

use self::requests::CommentRequest;

const COMMENT_TOKEN: &str = "comment_token";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(list_posts)
        .service(show_post)
        .service(add_comment);
}

#[get("/posts")]
async fn list_posts(
    pool: web::Data<DbPool>,
    session: Session,
    user: Option<CurrentUser>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let requested = query.into_inner().page;
    let (posts, pagination) = database::run(&pool, move |conn| {
        let pagination = Pagination::new(requested, POSTS_PER_PAGE, posts::count(conn)?);
        let posts = posts::list(conn, pagination.first_index(), pagination.per_page)?;
        Ok((posts, pagination))
    })
    .await?;

    let page = PostListPage { posts, pagination };
    Ok(views::render(
        &page,
        &PageContext::new(&session, user.map(|u| u.0)),
        StatusCode::OK,
    ))
}

async fn render_post(
    pool: &web::Data<DbPool>,
    session: &Session,
    user: Option<CurrentUser>,
    post_id: i32,
    comment_form: Option<CommentForm>,
    status: StatusCode,
) -> Result<HttpResponse> {
    let (post, comments) = database::run(pool, move |conn| {
        let post = posts::find_with_author(conn, post_id)?;
        let comments = comments::list_validated_for_post(conn, post_id)?;
        Ok((post, comments))
    })
    .await?;

    let comment_form = match (&user, comment_form) {
        (Some(_), Some(form)) => Some(form),
        (Some(_), None) => Some(CommentForm {
            content: String::new(),
            csrf_token: csrf::token(session, COMMENT_TOKEN)?,
            errors: Vec::new(),
        }),
        (None, _) => None,
    };

    let page = PostPage {
        post,
        comments,
        comment_form,
    };
    Ok(views::render(
        &page,
        &PageContext::new(session, user.map(|u| u.0)),
        status,
    ))
}

#[get("/posts/{id}")]
async fn show_post(
    pool: web::Data<DbPool>,
    session: Session,
    user: Option<CurrentUser>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    render_post(&pool, &session, user, path.into_inner(), None, StatusCode::OK).await
}

#[post("/posts/{id}/comments")]
async fn add_comment(
    pool: web::Data<DbPool>,
    session: Session,
    user: Option<CurrentUser>,
    path: web::Path<i32>,
    form: web::Form<CommentRequest>,
) -> Result<HttpResponse> {
    let post_id = path.into_inner();
    let form = form.into_inner();
    let author = match &user {
        Some(CurrentUser(user)) => user.id,
        None => return Ok(redirect("/login")),
    };
    csrf::verify(&session, COMMENT_TOKEN, &form.comment_token)?;

    if let Err(errors) = form.validate() {
        let comment_form = CommentForm {
            content: form.content,
            csrf_token: csrf::token(&session, COMMENT_TOKEN)?,
            errors: views::violations(&errors),
        };
        return render_post(
            &pool,
            &session,
            user,
            post_id,
            Some(comment_form),
            StatusCode::BAD_REQUEST,
        )
        .await;
    }

    let data = NewComment {
        post_id,
        author,
        content: form.content,
        is_validated: false,
        created_at: crate::utils::now_str(),
    };
    let comment = database::run(&pool, move |conn| comments::create(conn, data)).await?;
    tracing::info!(comment_id = comment.id, post_id, "comment submitted for moderation");

    session.add_flash(
        FLASH_SUCCESS,
        "Thanks! Your comment will appear once it has been approved.",
    )?;
    Ok(redirect(&format!("/posts/{}", post_id)))
}
