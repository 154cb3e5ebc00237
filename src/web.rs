//! Web UI: pick a department, ask a question, read the answer with its
//! sources and context.

use crate::department::Department;
use crate::error::{Result, SyllabusError};
use crate::rag::{QueryPipeline, RagAnswer};
use axum::Router;
use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use serde::Deserialize;
use std::fmt::Write;
use tracing::{error, info};

const STYLE: &str = r#"
body { background-color: #f0f8ff; font-family: sans-serif; }
.main-container { max-width: 800px; margin: auto; padding: 2rem; background-color: #ffffff;
  border-radius: 10px; box-shadow: 0px 4px 10px rgba(0, 0, 0, 0.1); }
.main-header { color: #2c3e50; font-size: 2em; text-align: center; font-weight: bold; }
.subheader { color: #34495e; font-weight: bold; margin-top: 10px; }
.answer { color: #2e8b57; font-size: 1.2em; font-weight: bold; }
.source { color: #8b0000; }
.error { color: #8b0000; font-weight: bold; }
pre { white-space: pre-wrap; }
button { background-color: #4CAF50; color: white; border: none; border-radius: 5px; padding: 0.5rem 1rem; }
"#;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: QueryPipeline,
}

/// Build the UI router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ask", post(ask))
        .with_state(state)
}

/// Serve the UI until the process is stopped.
pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| SyllabusError::io(bind, e))?;
    let addr = listener
        .local_addr()
        .map_err(|e| SyllabusError::io(bind, e))?;
    info!(%addr, "syllabus UI listening");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| SyllabusError::io(addr.to_string(), e))
}

#[derive(Debug, Deserialize)]
struct IndexParams {
    #[serde(default)]
    department: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AskForm {
    #[serde(default)]
    department: String,
    #[serde(default)]
    query: String,
}

/// An empty or placeholder selection means no department.
fn selected_department(raw: Option<&str>) -> Option<Department> {
    raw.filter(|s| !s.trim().is_empty())
        .and_then(|s| s.parse().ok())
}

async fn index(Query(params): Query<IndexParams>) -> Html<String> {
    let department = selected_department(params.department.as_deref());
    Html(render_page(department, "", ""))
}

async fn ask(
    State(state): State<AppState>,
    Form(form): Form<AskForm>,
) -> (StatusCode, Html<String>) {
    let Some(department) = selected_department(Some(form.department.as_str())) else {
        return (StatusCode::OK, Html(render_page(None, "", "")));
    };

    match state.pipeline.query(&form.query, department).await {
        Ok(answer) => (
            StatusCode::OK,
            Html(render_page(Some(department), &form.query, &render_answer(&answer))),
        ),
        Err(SyllabusError::EmptyQuery) => (
            StatusCode::OK,
            Html(render_page(
                Some(department),
                "",
                "<p>Please enter a query.</p>",
            )),
        ),
        Err(e) => {
            error!(error = %e, department = department.code(), "query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_page(
                    Some(department),
                    &form.query,
                    &format!("<p class=\"error\">{}</p>", escape_html(&e.to_string())),
                )),
            )
        }
    }
}

fn render_answer(answer: &RagAnswer) -> String {
    let mut html = String::new();
    html.push_str("<p class=\"answer\">Answer:</p>\n");
    let _ = writeln!(html, "<pre>{}</pre>", escape_html(&answer.response_text));

    html.push_str("<p class=\"answer\">Sources:</p>\n<ul class=\"source\">\n");
    for source in &answer.sources {
        let label = source.as_deref().unwrap_or("(no id)");
        let _ = writeln!(html, "<li>{}</li>", escape_html(label));
    }
    html.push_str("</ul>\n");

    html.push_str("<p class=\"answer\">Context:</p>\n");
    let _ = writeln!(html, "<pre>{}</pre>", escape_html(&answer.context));
    html
}

fn render_page(department: Option<Department>, query: &str, body: &str) -> String {
    let mut options = String::from("<option value=\"\">Select a department</option>\n");
    for d in Department::ALL {
        let selected = if Some(d) == department { " selected" } else { "" };
        let _ = writeln!(
            options,
            "<option value=\"{}\"{}>{}</option>",
            d.code(),
            selected,
            escape_html(d.label())
        );
    }

    let question_form = match department {
        Some(d) => format!(
            r#"<form method="post" action="/ask">
<input type="hidden" name="department" value="{code}">
<p class="subheader">Ask your question below:</p>
<input type="text" name="query" size="60" value="{query}">
<button type="submit">Submit</button>
</form>"#,
            code = d.code(),
            query = escape_html(query),
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>SyllabusBuddy</title>
<style>{style}</style>
</head>
<body>
<div class="main-container">
<p class="main-header">Syllabus Helper</p>
<p>Get syllabus-related answers specific to your department!</p>
<form method="get" action="/">
<p class="subheader">Select your department:</p>
<select name="department" onchange="this.form.submit()">
{options}</select>
<noscript><button type="submit">Select</button></noscript>
</form>
{question_form}
{body}
</div>
</body>
</html>
"#,
        style = STYLE,
    )
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
