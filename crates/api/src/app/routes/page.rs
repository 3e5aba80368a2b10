//! Server-rendered stock page for browsers.

use std::fmt::Write;
use std::sync::Arc;

use axum::{
    extract::Extension,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use stockroom_core::{Product, UnitNouns};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", get(stock_page))
}

pub async fn stock_page(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.ledger.list_all().await {
        Ok(products) => Html(render_stock_page(&products, &services.nouns)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub fn render_stock_page(products: &[Product], nouns: &UnitNouns) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Inventory Tracker</title>\n</head>\n<body>\n<h1>Current Inventory</h1>\n",
    );

    if products.is_empty() {
        html.push_str("<p>No products in inventory.</p>\n");
    } else {
        html.push_str("<ul>\n");
        for product in products {
            let _ = writeln!(html, "<li>{}</li>", escape_html(&nouns.stock_line(product)));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
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
