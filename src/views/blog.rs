use super::{csrf_field, error_list, escape, paragraphs, Template};
use crate::{
    models::{comments::PublishedComment, posts::PostWithAuthor},
    protocol::Pagination,
    utils::display_date,
};

pub fn post_summary(item: &PostWithAuthor) -> String {
    format!(
        r#"<article class="post-summary"><h3><a href="/posts/{id}">{title}</a></h3><p class="meta">{author}, {date}</p><p>{lede}</p></article>"#,
        id = item.post.id,
        title = escape(&item.post.title),
        author = escape(&item.author_name),
        date = escape(&display_date(&item.post.created_at)),
        lede = escape(&item.post.lede),
    )
}

pub struct PostListPage {
    pub posts: Vec<PostWithAuthor>,
    pub pagination: Pagination,
}

impl Template for PostListPage {
    fn title(&self) -> String {
        "Blog".to_string()
    }

    fn body(&self) -> String {
        let posts: String = if self.posts.is_empty() {
            "<p>No posts here.</p>".to_string()
        } else {
            self.posts.iter().map(post_summary).collect()
        };

        let mut nav = String::new();
        if self.pagination.has_previous() {
            nav.push_str(&format!(
                r#"<a rel="prev" href="/posts?page={}">Newer</a> "#,
                self.pagination.page - 1
            ));
        }
        nav.push_str(&format!(
            "<span>Page {} of {}</span>",
            self.pagination.page,
            self.pagination.total_pages()
        ));
        if self.pagination.has_next() {
            nav.push_str(&format!(
                r#" <a rel="next" href="/posts?page={}">Older</a>"#,
                self.pagination.page + 1
            ));
        }

        format!(
            r#"<h1>Blog</h1>{}<nav class="pagination">{}</nav>"#,
            posts, nav
        )
    }
}

pub struct CommentForm {
    pub content: String,
    pub csrf_token: String,
    pub errors: Vec<String>,
}

pub struct PostPage {
    pub post: PostWithAuthor,
    pub comments: Vec<PublishedComment>,
    /// `None` for anonymous visitors.
    pub comment_form: Option<CommentForm>,
}

impl Template for PostPage {
    fn title(&self) -> String {
        self.post.post.title.clone()
    }

    fn body(&self) -> String {
        let post = &self.post.post;

        let comments: String = if self.comments.is_empty() {
            "<p>No comments yet.</p>".to_string()
        } else {
            self.comments
                .iter()
                .map(|c| {
                    format!(
                        r#"<article class="comment"><p class="meta">{}, {}</p>{}</article>"#,
                        escape(&c.author_name),
                        escape(&display_date(&c.comment.created_at)),
                        paragraphs(&c.comment.content)
                    )
                })
                .collect()
        };

        let form = match &self.comment_form {
            Some(form) => format!(
                r#"<h3>Leave a comment</h3>{errors}<form method="post" action="/posts/{id}/comments">{csrf}<textarea name="content" required>{content}</textarea><button type="submit">Comment</button></form>"#,
                errors = error_list(&form.errors),
                id = post.id,
                csrf = csrf_field("comment_token", &form.csrf_token),
                content = escape(&form.content),
            ),
            None => r#"<p><a href="/login">Log in</a> to leave a comment.</p>"#.to_string(),
        };

        let updated = if post.updated_at != post.created_at {
            format!(", updated {}", escape(&display_date(&post.updated_at)))
        } else {
            String::new()
        };

        format!(
            r#"<article class="post"><h1>{title}</h1><p class="meta">{author}, {date}{updated}</p><p class="lede">{lede}</p>{content}</article>
<section class="comments"><h2>Comments</h2>{comments}{form}</section>"#,
            title = escape(&post.title),
            author = escape(&self.post.author_name),
            date = escape(&display_date(&post.created_at)),
            updated = updated,
            lede = escape(&post.lede),
            content = paragraphs(&post.content),
            comments = comments,
            form = form,
        )
    }
}
