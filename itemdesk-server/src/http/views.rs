//! HTML pages
//!
//! Every interpolated value goes through [`escape`].

use super::flash::Notice;
use crate::models::Item;

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

fn layout(title: &str, notices: &[Notice], body: &str) -> String {
    let notices: String = notices
        .iter()
        .map(|n| {
            format!(
                "      <li class=\"notice notice-{}\">{}</li>\n",
                n.level.as_str(),
                escape(&n.message)
            )
        })
        .collect();
    let notices = if notices.is_empty() {
        String::new()
    } else {
        format!("    <ul class=\"notices\">\n{}    </ul>\n", notices)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>{title} - itemdesk</title>
    <style>
      body {{ font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }}
      .notice-success {{ color: #1b5e20; }}
      .notice-error {{ color: #b71c1c; }}
      td form {{ display: inline; }}
    </style>
  </head>
  <body>
    <nav><a href="/">Items</a> | <a href="/add">Add item</a></nav>
{notices}    <h1>{title}</h1>
{body}  </body>
</html>
"#,
        title = escape(title),
        notices = notices,
        body = body,
    )
}

/// Item list, newest first
pub fn index(items: &[Item], notices: &[Notice]) -> String {
    let body = if items.is_empty() {
        "    <p>No items yet.</p>\n".to_string()
    } else {
        let rows: String = items
            .iter()
            .map(|item| {
                format!(
                    concat!(
                        "      <tr>\n",
                        "        <td>{id}</td>\n",
                        "        <td>{name}</td>\n",
                        "        <td>\n",
                        "          <a href=\"/edit/{id}\">Edit</a>\n",
                        "          <form method=\"post\" action=\"/delete/{id}\">",
                        "<button type=\"submit\">Delete</button></form>\n",
                        "        </td>\n",
                        "      </tr>\n",
                    ),
                    id = item.id,
                    name = escape(&item.name),
                )
            })
            .collect();
        format!(
            "    <table>\n      <tr><th>ID</th><th>Name</th><th></th></tr>\n{}    </table>\n",
            rows
        )
    };

    layout("Items", notices, &body)
}

fn name_form(action: &str, value: &str, submit: &str) -> String {
    format!(
        concat!(
            "    <form method=\"post\" action=\"{action}\">\n",
            "      <label for=\"name\">Name</label>\n",
            "      <input type=\"text\" id=\"name\" name=\"name\" value=\"{value}\">\n",
            "      <button type=\"submit\">{submit}</button>\n",
            "    </form>\n",
        ),
        action = escape(action),
        value = escape(value),
        submit = escape(submit),
    )
}

/// Empty form for a new item
pub fn add_form(notices: &[Notice]) -> String {
    layout("Add item", notices, &name_form("/add", "", "Add"))
}

/// Form pre-filled with the stored item
pub fn edit_form(item: &Item, notices: &[Notice]) -> String {
    let action = format!("/edit/{}", item.id);
    layout("Edit item", notices, &name_form(&action, &item.name, "Save"))
}

pub fn not_found() -> String {
    layout(
        "Page not found",
        &[],
        "    <p>The page you asked for does not exist. <a href=\"/\">Back to the item list</a>.</p>\n",
    )
}
