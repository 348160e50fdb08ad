use super::{button_form, csrf_field, error_list, escape, Template};
use crate::{
    models::{
        comments::PendingComment,
        posts::PostWithAuthor,
        users::{User, ROLE_ADMIN, ROLE_USER},
    },
    utils::display_date,
};

pub struct DashboardPage {
    pub posts: i64,
    pub users: i64,
    pub pending_comments: i64,
}

impl Template for DashboardPage {
    fn title(&self) -> String {
        "Administration".to_string()
    }

    fn body(&self) -> String {
        format!(
            r#"<h1>Administration</h1>
<ul class="dashboard">
<li><a href="/admin/posts">Posts</a>: {}</li>
<li><a href="/admin/comments">Comments awaiting moderation</a>: {}</li>
<li><a href="/admin/users">Users</a>: {}</li>
</ul>"#,
            self.posts, self.pending_comments, self.users
        )
    }
}

pub struct CommentsPage {
    pub pending: Vec<PendingComment>,
    pub csrf_token: String,
}

impl Template for CommentsPage {
    fn title(&self) -> String {
        "Moderate comments".to_string()
    }

    fn body(&self) -> String {
        if self.pending.is_empty() {
            return "<h1>Moderate comments</h1><p>Nothing to moderate.</p>".to_string();
        }

        let rows: String = self
            .pending
            .iter()
            .map(|item| {
                let id = item.comment.id;
                format!(
                    r#"<tr><td><a href="/posts/{post_id}">{post}</a></td><td>{author}</td><td>{date}</td><td>{content}</td><td>{approve} {delete}</td></tr>"#,
                    post_id = item.comment.post_id,
                    post = escape(&item.post_title),
                    author = escape(&item.author_name),
                    date = escape(&display_date(&item.comment.created_at)),
                    content = escape(&item.comment.content),
                    approve = button_form(
                        &format!("/admin/comments/{}/validate", id),
                        "comment_moderation_token",
                        &self.csrf_token,
                        "Approve"
                    ),
                    delete = button_form(
                        &format!("/admin/comments/{}/delete", id),
                        "comment_moderation_token",
                        &self.csrf_token,
                        "Delete"
                    ),
                )
            })
            .collect();

        format!(
            r#"<h1>Moderate comments</h1><table><thead><tr><th>Post</th><th>Author</th><th>Date</th><th>Comment</th><th></th></tr></thead><tbody>{}</tbody></table>"#,
            rows
        )
    }
}

pub struct PostsPage {
    pub posts: Vec<PostWithAuthor>,
    pub csrf_token: String,
}

impl Template for PostsPage {
    fn title(&self) -> String {
        "Manage posts".to_string()
    }

    fn body(&self) -> String {
        let rows: String = self
            .posts
            .iter()
            .map(|item| {
                let id = item.post.id;
                format!(
                    r#"<tr><td><a href="/posts/{id}">{title}</a></td><td>{author}</td><td>{updated}</td><td><a href="/admin/posts/{id}/edit">Edit</a> {delete}</td></tr>"#,
                    id = id,
                    title = escape(&item.post.title),
                    author = escape(&item.author_name),
                    updated = escape(&display_date(&item.post.updated_at)),
                    delete = button_form(
                        &format!("/admin/posts/{}/delete", id),
                        "post_token",
                        &self.csrf_token,
                        "Delete"
                    ),
                )
            })
            .collect();

        format!(
            r#"<h1>Manage posts</h1><p><a href="/admin/posts/new">New post</a></p><table><thead><tr><th>Title</th><th>Author</th><th>Updated</th><th></th></tr></thead><tbody>{}</tbody></table>"#,
            rows
        )
    }
}

#[derive(Default)]
pub struct PostFormPage {
    pub heading: String,
    pub action: String,
    pub title: String,
    pub lede: String,
    pub content: String,
    pub errors: Vec<String>,
    pub csrf_token: String,
}

impl Template for PostFormPage {
    fn title(&self) -> String {
        self.heading.clone()
    }

    fn body(&self) -> String {
        format!(
            r#"<h1>{heading}</h1>{errors}
<form method="post" action="{action}">
{csrf}
<label>Title <input type="text" name="title" value="{title}" required></label>
<label>Lede <textarea name="lede" required>{lede}</textarea></label>
<label>Content <textarea name="content" rows="20" required>{content}</textarea></label>
<button type="submit">Save</button>
</form>
<p><a href="/admin/posts">Back to posts</a></p>"#,
            heading = escape(&self.heading),
            errors = error_list(&self.errors),
            action = escape(&self.action),
            csrf = csrf_field("post_token", &self.csrf_token),
            title = escape(&self.title),
            lede = escape(&self.lede),
            content = escape(&self.content),
        )
    }
}

pub struct UsersPage {
    pub users: Vec<User>,
    pub current_user_id: i32,
    pub csrf_token: String,
}

impl UsersPage {
    fn actions(&self, user: &User) -> String {
        if user.id == self.current_user_id {
            return "<em>you</em>".to_string();
        }

        let (next_role, label) = if user.is_admin() {
            (ROLE_USER, "Make user")
        } else {
            (ROLE_ADMIN, "Make admin")
        };
        format!(
            r#"<form method="post" action="/admin/users/{id}/role" class="inline">{csrf}<input type="hidden" name="role" value="{role}"><button type="submit">{label}</button></form> {delete}"#,
            id = user.id,
            csrf = csrf_field("user_token", &self.csrf_token),
            role = next_role,
            label = label,
            delete = button_form(
                &format!("/admin/users/{}/delete", user.id),
                "user_token",
                &self.csrf_token,
                "Delete"
            ),
        )
    }
}

impl Template for UsersPage {
    fn title(&self) -> String {
        "Manage users".to_string()
    }

    fn body(&self) -> String {
        let rows: String = self
            .users
            .iter()
            .map(|user| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape(&user.username),
                    escape(&user.email),
                    escape(&user.role),
                    escape(&display_date(&user.created_at)),
                    self.actions(user)
                )
            })
            .collect();

        format!(
            r#"<h1>Manage users</h1><table><thead><tr><th>Username</th><th>Email</th><th>Role</th><th>Joined</th><th></th></tr></thead><tbody>{}</tbody></table>"#,
            rows
        )
    }
}
