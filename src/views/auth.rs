use super::{button_form, csrf_field, error_list, escape, Template};

pub struct LoginPage {
    pub username: String,
    pub error: Option<String>,
    pub csrf_token: String,
}

impl Template for LoginPage {
    fn title(&self) -> String {
        "Log in".to_string()
    }

    fn body(&self) -> String {
        let error = match &self.error {
            Some(error) => format!(r#"<p class="flash flash-error">{}</p>"#, escape(error)),
            None => String::new(),
        };
        format!(
            r#"<h1>Log in</h1>{error}
<form method="post" action="/login">
{csrf}
<label>Username <input type="text" name="username" value="{username}" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>
<p>No account yet? <a href="/register">Register</a></p>"#,
            error = error,
            csrf = csrf_field("login_token", &self.csrf_token),
            username = escape(&self.username),
        )
    }
}

pub struct RegisterPage {
    pub username: String,
    pub email: String,
    pub errors: Vec<String>,
    pub csrf_token: String,
}

impl Template for RegisterPage {
    fn title(&self) -> String {
        "Register".to_string()
    }

    fn body(&self) -> String {
        format!(
            r#"<h1>Create an account</h1>{errors}
<form method="post" action="/register">
{csrf}
<label>Username <input type="text" name="username" value="{username}" required></label>
<label>Email <input type="email" name="email" value="{email}" required></label>
<label>Password <input type="password" name="password" required></label>
<label>Repeat password <input type="password" name="password_confirm" required></label>
<button type="submit">Register</button>
</form>"#,
            errors = error_list(&self.errors),
            csrf = csrf_field("register_token", &self.csrf_token),
            username = escape(&self.username),
            email = escape(&self.email),
        )
    }
}

/// Asks for confirmation so that logging out always goes through a POST.
pub struct LogoutPage {
    pub csrf_token: String,
}

impl Template for LogoutPage {
    fn title(&self) -> String {
        "Log out".to_string()
    }

    fn body(&self) -> String {
        format!(
            "<h1>Log out</h1><p>Do you want to end your session?</p>{}",
            button_form("/logout", "logout_token", &self.csrf_token, "Log out")
        )
    }
}
