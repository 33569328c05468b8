// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTML for the two human-facing pages.

use crate::models::{Project, User};

/// Escape text for use in HTML content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, flash: Option<&str>, body: &str) -> String {
    let flash = flash
        .map(|m| format!("<p class=\"flash\">{}</p>\n", escape_html(m)))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n</head>\n<body>\n{}{}</body>\n</html>\n",
        escape_html(title),
        flash,
        body
    )
}

fn account_nav(user: Option<&User>) -> String {
    match user {
        Some(user) => format!(
            "<nav>Signed in as <a href=\"{}\">{}</a> ({}) | <a href=\"/logout\">Log out</a></nav>\n",
            escape_html(&user.profile),
            escape_html(user.display_name()),
            escape_html(&user.user_id)
        ),
        None => "<nav><a href=\"/login\">Log in with GitHub</a></nav>\n".to_string(),
    }
}

/// Home page: who is signed in and every project.
pub fn home_page(user: Option<&User>, projects: &[Project], flash: Option<&str>) -> String {
    let mut body = account_nav(user);
    body.push_str("<h1>Projects</h1>\n");

    if projects.is_empty() {
        body.push_str("<p>No projects yet.</p>\n");
    } else {
        body.push_str("<ul id=\"mainProjectList\">\n");
        for project in projects {
            body.push_str(&format!(
                "<li><a href=\"/projects/{}\">{}</a></li>\n",
                urlencoding::encode(&project.slug),
                escape_html(&project.project_name)
            ));
        }
        body.push_str("</ul>\n");
    }

    body.push_str("<p><a href=\"/projects/create\">New project</a></p>\n");
    layout("Projects", flash, &body)
}

/// Project creation form; posts url-encoded fields back to `/projects/create`.
pub fn create_project_page(user: Option<&User>, flash: Option<&str>) -> String {
    let mut body = account_nav(user);
    body.push_str("<h1>New project</h1>\n");

    if user.is_none() {
        body.push_str("<p>You must log in before creating a project.</p>\n");
    }

    let owner = user.map(|u| escape_html(&u.user_id)).unwrap_or_default();
    body.push_str(&format!(
        "<form method=\"post\" action=\"/projects/create\">\n\
         <label>Name <input name=\"project_name\" required></label>\n\
         <label>Owner <input name=\"owner_id\" value=\"{}\"></label>\n\
         <label>Members (comma separated) <input name=\"members\"></label>\n\
         <label>Repository <input name=\"project_repo\"></label>\n\
         <label>URL <input name=\"project_url\"></label>\n\
         <label>Description <textarea name=\"project_description\"></textarea></label>\n\
         <button type=\"submit\">Create</button>\n\
         </form>\n",
        owner
    ));

    layout("New project", flash, &body)
}
