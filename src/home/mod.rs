mod requests;

use actix_web::{get, http::StatusCode, post, web, HttpResponse};
use validator::Validate;

use crate::{
    auth::utils::CurrentUser,
    config::Settings,
    database::{self, posts},
    error::Result,
    mailer::{Email, Mailer},
    protocol::redirect,
    session::{csrf, Session, FLASH_SUCCESS},
    views::{
        self,
        home::{ContactForm, HomePage},
        PageContext,
    },
    DbPool,
};

use self::requests::ContactRequest;

const CONTACT_TOKEN: &str = "contact_token";
const LATEST_POSTS: i64 = 3;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(root).service(index).service(contact);
}

async fn render_home(
    pool: &web::Data<DbPool>,
    session: &Session,
    user: Option<CurrentUser>,
    contact_form: ContactForm,
    status: StatusCode,
) -> Result<HttpResponse> {
    let latest = database::run(pool, |conn| posts::latest(conn, LATEST_POSTS)).await?;
    let page = HomePage {
        latest,
        contact: contact_form,
        csrf_token: csrf::token(session, CONTACT_TOKEN)?,
    };
    Ok(views::render(
        &page,
        &PageContext::new(session, user.map(|u| u.0)),
        status,
    ))
}

#[get("/")]
async fn root() -> HttpResponse {
    redirect("/home")
}

#[get("/home")]
async fn index(
    pool: web::Data<DbPool>,
    session: Session,
    user: Option<CurrentUser>,
) -> Result<HttpResponse> {
    render_home(&pool, &session, user, ContactForm::default(), StatusCode::OK).await
}

#[post("/contact")]
async fn contact(
    pool: web::Data<DbPool>,
    mailer: web::Data<dyn Mailer>,
    settings: web::Data<Settings>,
    session: Session,
    user: Option<CurrentUser>,
    form: web::Form<ContactRequest>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    csrf::verify(&session, CONTACT_TOKEN, &form.contact_token)?;

    if let Err(errors) = form.validate() {
        let contact_form = ContactForm {
            name: form.name,
            email: form.email,
            subject: form.subject,
            message: form.message,
            errors: views::violations(&errors),
        };
        return render_home(&pool, &session, user, contact_form, StatusCode::BAD_REQUEST).await;
    }

    let email = Email {
        to: settings.contact_recipient.clone(),
        reply_to: Some(form.email.clone()),
        subject: format!("[Portfolio] {}", form.subject),
        body: format!(
            "Message from {} <{}>:\n\n{}",
            form.name, form.email, form.message
        ),
    };
    mailer.send(email).await?;
    tracing::info!(from = %form.email, "contact message forwarded");

    session.add_flash(FLASH_SUCCESS, "Thanks, your message has been sent.")?;
    Ok(redirect("/home"))
}
