use actix_web::http::StatusCode;

use super::{escape, Template};

pub struct ErrorPage {
    pub status: StatusCode,
    pub message: String,
}

impl Template for ErrorPage {
    fn title(&self) -> String {
        format!(
            "{} {}",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("Error")
        )
    }

    fn body(&self) -> String {
        format!(
            r#"<section class="error"><h1>{}</h1><p>{}</p><p><a href="/home">Back to the homepage</a></p></section>"#,
            escape(&self.title()),
            escape(&self.message)
        )
    }
}
