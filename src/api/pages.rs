use axum::response::Html;
use html_escape::encode_text;
use tower_sessions::Session;

use crate::auth::session::current_username;

/// The two shell variants. Which one renders is decided by a single
/// authentication query at request time; there is no other branching.
enum Layout {
    Login,
    App { username: String },
}

impl Layout {
    fn render(&self) -> String {
        match self {
            Layout::Login => page(
                "Login",
                r#"<form id="login" method="post" action="/api/auth/login" class="card">
  <h1>Gab's badminton group</h1>
  <label>Username <input type="text" name="username" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Login</button>
  <p id="login-error" hidden>Invalid username or password</p>
</form>
<script>
document.getElementById("login").addEventListener("submit", async (e) => {
  e.preventDefault();
  const res = await fetch(e.target.action, {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify(Object.fromEntries(new FormData(e.target))),
  });
  if (res.ok) location.reload();
  else document.getElementById("login-error").hidden = false;
});
</script>"#
                    .to_string(),
            ),
            Layout::App { username } => page(
                "Home",
                format!(
                    r#"<nav>
  <a href="/">Home</a>
  <a href="/#play">Play</a>
  <span class="user">Welcome, {user}</span>
  <button id="logout" data-action="/api/auth/logout">Logout</button>
</nav>
<main id="app" data-upcoming="/api/home/upcoming" data-calendar="/api/calendar"></main>
<script>
document.getElementById("logout").addEventListener("click", async (e) => {{
  await fetch(e.target.dataset.action, {{ method: "POST" }});
  location.reload();
}});
</script>"#,
                    user = encode_text(username)
                ),
            ),
        }
    }
}

/// GET /
pub async fn index(session: Session) -> Html<String> {
    let layout = match current_username(&session).await {
        Some(username) => Layout::App { username },
        None => Layout::Login,
    };

    Html(layout.render())
}

fn page(title: &str, body: String) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Birdie - {title}</title></head>
<body>{body}</body>
</html>"#
    )
}
