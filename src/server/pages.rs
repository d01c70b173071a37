//! HTML pages. Plain string templates; every user-supplied value goes
//! through [`escape`].

use axum::response::Html;
use std::fmt::Write;

use crate::identity::Profile;
use crate::models::{Document, User};
use crate::service::DocumentView;

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, actor: Option<&User>, body: &str) -> Html<String> {
    let nav = match actor {
        Some(user) => format!(
            r#"<a href="/">Documents</a> | <a href="/documents/create">New document</a> | <a href="/profile">{}</a> | <a href="/logout">Log out</a>"#,
            escape(&user.username)
        ),
        None => r#"<a href="/login">Log in</a>"#.to_string(),
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{} - docshare</title></head>
<body>
<nav>{}</nav>
<main>
{}
</main>
</body>
</html>"#,
        escape(title),
        nav,
        body
    ))
}

pub fn login(failed: bool) -> Html<String> {
    let notice = if failed {
        "<p class=\"error\">Invalid username or password.</p>\n"
    } else {
        ""
    };
    let body = format!(
        r#"<h1>Log in</h1>
{}<form method="post" action="/login">
<label>Username <input name="username" autofocus></label>
<label>Password <input name="password" type="password"></label>
<button type="submit">Log in</button>
</form>"#,
        notice
    );
    layout("Log in", None, &body)
}

pub fn index(actor: &User, documents: &[Document]) -> Html<String> {
    let mut body = String::from("<h1>Your documents</h1>\n");
    if documents.is_empty() {
        body.push_str("<p>No documents yet.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for doc in documents {
            let _ = writeln!(
                body,
                r#"<li><a href="/documents/{id}">{title}</a> <a href="/documents/{id}/edit">edit</a> <a href="/documents/{id}/share">share</a></li>"#,
                id = doc.id,
                title = escape(&doc.title)
            );
        }
        body.push_str("</ul>\n");
    }
    body.push_str(r#"<p><a href="/documents/create">Create a document</a></p>"#);
    layout("Documents", Some(actor), &body)
}

fn document_form(action: &str, title: &str, content: &str, submit: &str) -> String {
    format!(
        r#"<form method="post" action="{}">
<label>Title <input name="title" value="{}"></label>
<label>Content <textarea name="content" rows="20" cols="80">{}</textarea></label>
<button type="submit">{}</button>
</form>"#,
        action,
        escape(title),
        escape(content),
        submit
    )
}

pub fn create_document(actor: &User) -> Html<String> {
    let body = format!(
        "<h1>New document</h1>\n{}",
        document_form("/documents/create", "", "", "Create")
    );
    layout("New document", Some(actor), &body)
}

pub fn edit_document(actor: &User, document: &Document) -> Html<String> {
    let body = format!(
        "<h1>Edit {}</h1>\n{}",
        escape(&document.title),
        document_form(
            &format!("/documents/{}/edit", document.id),
            &document.title,
            &document.content,
            "Save"
        )
    );
    layout("Edit document", Some(actor), &body)
}

pub fn share_document(actor: &User, document: &Document) -> Html<String> {
    let body = format!(
        r#"<h1>Share {}</h1>
<form method="post" action="/documents/{}/share">
<label>Username <input name="username"></label>
<button type="submit">Share</button>
</form>"#,
        escape(&document.title),
        document.id
    );
    layout("Share document", Some(actor), &body)
}

pub fn view_document(actor: &User, view: &DocumentView) -> Html<String> {
    let document = &view.document;
    let mut body = format!(
        "<h1>{}</h1>\n<p>Owner: {}</p>\n<pre>{}</pre>\n",
        escape(&document.title),
        escape(&view.owner.username),
        escape(&document.content)
    );
    if !view.collaborators.is_empty() {
        let names: Vec<String> = view
            .collaborators
            .iter()
            .map(|u| escape(&u.username))
            .collect();
        let _ = writeln!(body, "<p>Shared with: {}</p>", names.join(", "));
    }
    if document.is_owned_by(actor.id) {
        let _ = write!(
            body,
            r#"<p><a href="/documents/{id}/edit">Edit</a> | <a href="/documents/{id}/share">Share</a></p>"#,
            id = document.id
        );
    }
    layout(&document.title, Some(actor), &body)
}

pub fn profile(actor: &User, profile: &Profile) -> Html<String> {
    let body = format!(
        "<h1>Profile</h1>\n<dl>\n<dt>ID</dt><dd>{}</dd>\n<dt>Username</dt><dd>{}</dd>\n<dt>Email</dt><dd>{}</dd>\n</dl>",
        profile.id,
        escape(&profile.username),
        escape(&profile.email)
    );
    layout("Profile", Some(actor), &body)
}

pub fn not_found() -> Html<String> {
    layout(
        "Not found",
        None,
        "<h1>Not Found</h1>\n<p>The requested URL was not found on the server.</p>",
    )
}

pub fn internal_error() -> Html<String> {
    layout(
        "Error",
        None,
        "<h1>Internal Server Error</h1>\n<p>Something went wrong.</p>",
    )
}
