use super::{blog::post_summary, csrf_field, error_list, escape, Template};
use crate::models::posts::PostWithAuthor;

#[derive(Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub errors: Vec<String>,
}

pub struct HomePage {
    pub latest: Vec<PostWithAuthor>,
    pub contact: ContactForm,
    pub csrf_token: String,
}

impl Template for HomePage {
    fn title(&self) -> String {
        "Home".to_string()
    }

    fn body(&self) -> String {
        let latest = if self.latest.is_empty() {
            "<p>Nothing published yet.</p>".to_string()
        } else {
            self.latest.iter().map(post_summary).collect()
        };

        format!(
            r#"<section class="intro"><h1>Hello, welcome to my portfolio</h1></section>
<section class="latest"><h2>Latest posts</h2>{latest}<p><a href="/posts">All posts</a></p></section>
<section id="contact"><h2>Contact me</h2>{errors}
<form method="post" action="/contact">
{csrf}
<label>Name <input type="text" name="name" value="{name}" required></label>
<label>Email <input type="email" name="email" value="{email}" required></label>
<label>Subject <input type="text" name="subject" value="{subject}" required></label>
<label>Message <textarea name="message" required>{message}</textarea></label>
<button type="submit">Send</button>
</form></section>"#,
            latest = latest,
            errors = error_list(&self.contact.errors),
            csrf = csrf_field("contact_token", &self.csrf_token),
            name = escape(&self.contact.name),
            email = escape(&self.contact.email),
            subject = escape(&self.contact.subject),
            message = escape(&self.contact.message),
        )
    }
}
