use actix_web::{http::header, HttpResponse};
use serde::Deserialize;

pub const POSTS_PER_PAGE: i64 = 10;

/// 303 so the browser follows a POST with a GET.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[derive(Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: i64, total: i64) -> Self {
        let per_page = per_page.max(1);
        let mut pagination = Self {
            page: 1,
            per_page,
            total: total.max(0),
        };
        pagination.page = page.unwrap_or(1).clamp(1, pagination.total_pages());
        pagination
    }

    pub fn total_pages(&self) -> i64 {
        ((self.total + self.per_page - 1) / self.per_page).max(1)
    }

    pub fn first_index(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_page_into_range() {
        let p = Pagination::new(Some(7), 10, 25);
        assert_eq!(p.page, 3);
        assert_eq!(p.total_pages(), 3);
        assert_eq!(p.first_index(), 20);
        assert!(p.has_previous());
        assert!(!p.has_next());

        let p = Pagination::new(Some(-2), 10, 25);
        assert_eq!(p.page, 1);
        assert_eq!(p.first_index(), 0);
        assert!(p.has_next());
    }

    #[test]
    fn empty_listing_has_one_page() {
        let p = Pagination::new(None, 10, 0);
        assert_eq!(p.total_pages(), 1);
        assert_eq!(p.page, 1);
        assert!(!p.has_previous());
        assert!(!p.has_next());
    }

    #[test]
    fn redirect_sets_location() {
        let res = redirect("/home");
        assert_eq!(res.status(), actix_web::http::StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
            "/home"
        );
    }
}
