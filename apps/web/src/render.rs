//! Server-rendered pages for the three wizard steps.

use std::sync::OnceLock;

use axum::{
    http::header::CONTENT_TYPE,
    response::{Html, IntoResponse},
};
use minijinja::{context, Environment, Value};
use tracing::error;

const TEMPLATES: [(&str, &str); 4] = [
    ("layout.html", include_str!("../templates/layout.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("job.html", include_str!("../templates/job.html")),
    ("chat.html", include_str!("../templates/chat.html")),
];

const PAGE_SCRIPT: &str = include_str!("../static/script.js");

static PAGES: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Upload,
    Job,
    Chat,
}

impl Page {
    fn template(self) -> &'static str {
        match self {
            Page::Upload => "index.html",
            Page::Job => "job.html",
            Page::Chat => "chat.html",
        }
    }

    /// Position in the wizard, for the step indicator.
    fn step(self) -> u8 {
        match self {
            Page::Upload => 1,
            Page::Job => 2,
            Page::Chat => 3,
        }
    }
}

fn environment() -> &'static Environment<'static> {
    PAGES.get_or_init(|| {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            // A broken template surfaces as a render error for that page.
            if let Err(e) = env.add_template(name, source) {
                error!("Template {name} failed to parse: {e}");
            }
        }
        env
    })
}

/// Renders `page` with `ctx`. Output is auto-escaped.
pub fn render_page(page: Page, ctx: Value) -> Result<Html<String>, minijinja::Error> {
    let html = environment()
        .get_template(page.template())?
        .render(context! { step => page.step(), ..ctx })?;
    Ok(Html(html))
}

/// GET /static/script.js
pub async fn page_script() -> impl IntoResponse {
    ([(CONTENT_TYPE, "application/javascript")], PAGE_SCRIPT)
}
