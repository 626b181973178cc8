//! HTTP routes: each handler makes one or two quote-service calls and renders a template.

use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web::error::ErrorInternalServerError;
use actix_web::http::header;
use askama::Template;
use log::{error, info, warn};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::sayings::{is_not_found, Saying, SayingId};
use crate::service::{RequestContext, Submission};

/// Body of the redirect page shown after a successful submission
pub const SUBMITTED_BODY: &str = "You are being redirected!\n<meta HTTP-EQUIV=\"REFRESH\" content=\"1; url=/\">";
/// Shown when a submission is refused
pub const REJECTED_BODY: &str = "That is a duplicate or is too short";
/// Shown on the index page while the store is empty
pub const EMPTY_STORE_TEXT: &str = "No quotes have been submitted yet.";

#[derive(Template)]
#[template(path = "rickbot.html")]
struct QuoteTemplate {
    rickquote: String,
    shareme: Option<String>,
}

#[derive(Template)]
#[template(path = "list.html")]
struct ListTemplate {
    list_of_quotes: Vec<Saying>,
    req_url: String,
}

#[derive(Template)]
#[template(path = "search.html")]
struct SearchTemplate {
    keyword: String,
    search_results: Vec<Saying>,
}

/// Form posted to `/quote`
#[derive(Debug, Deserialize)]
pub struct QuoteForm {
    pub saying: String,
}

fn render<T: Template>(template: &T) -> Result<HttpResponse, Error> {
    let html = template.render().map_err(|e| {
        error!("Failed to render template: {}", e);
        ErrorInternalServerError(format!("Failed to render template: {}", e))
    })?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

fn redirect_home() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

/// A random quote with a link to share it
pub async fn index(req: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let context = RequestContext::from_request(&req);
    info!("{} requested a quote", context.remote_addr);

    match app_state.quote_service.get_random_quote() {
        Ok(quote) => render(&QuoteTemplate {
            shareme: Some(context.quote_link(quote.id)),
            rickquote: quote.text,
        }),
        Err(e) if is_not_found(&e) => {
            warn!("No quotes stored yet");
            render(&QuoteTemplate {
                rickquote: EMPTY_STORE_TEXT.to_string(),
                shareme: None,
            })
        }
        Err(e) => Err(e),
    }
}

/// Old bookmarks pointed at the script itself
pub async fn legacy_index() -> HttpResponse {
    redirect_home()
}

/// Submit a new quote
pub async fn put_quote(req: HttpRequest, form: web::Form<QuoteForm>, app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let context = RequestContext::from_request(&req);
    info!("{} is submitting a quote", context.remote_addr);

    let outcome = app_state.quote_service.submit(&form.saying).map_err(|e| {
        error!("Failed to store submitted quote: {}", e);
        e
    })?;

    let body = match outcome {
        Submission::Accepted(_) => SUBMITTED_BODY,
        Submission::TooShort | Submission::Duplicate => REJECTED_BODY,
    };
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// A single quote; anything that goes wrong sends the visitor home
pub async fn display_quote(req: HttpRequest, path: web::Path<String>, app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let context = RequestContext::from_request(&req);
    let quoteno = path.into_inner();

    let id: SayingId = match quoteno.parse() {
        Ok(id) => id,
        Err(_) => {
            warn!("Invalid quote id requested: {}", quoteno);
            return Ok(redirect_home());
        }
    };

    match app_state.quote_service.get_quote_by_id(id) {
        Ok(quote) => render(&QuoteTemplate {
            rickquote: quote.text,
            shareme: Some(context.url()),
        }),
        Err(e) if is_not_found(&e) => {
            warn!("Quote {} does not exist", id);
            Ok(redirect_home())
        }
        Err(e) => {
            error!("Failed to fetch quote {}: {}", id, e);
            Ok(redirect_home())
        }
    }
}

/// Every quote
pub async fn list_all_quotes(req: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let context = RequestContext::from_request(&req);
    let quotes = app_state.quote_service.list_all()?;
    info!("Listing {} quotes for {}", quotes.len(), context.remote_addr);

    render(&ListTemplate {
        list_of_quotes: quotes,
        req_url: context.host,
    })
}

/// Case-insensitive keyword search
pub async fn search_for(req: HttpRequest, path: web::Path<String>, app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let context = RequestContext::from_request(&req);
    let keyword = path.into_inner();
    let matches = app_state.quote_service.search(&keyword)?;
    info!("{} searched for '{}': {} matches", context.remote_addr, keyword, matches.len());

    render(&SearchTemplate {
        keyword,
        search_results: matches,
    })
}

/// Fallback for unknown routes
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body("<h1>No matching route found</h1>")
}

/// Register every route on an app.
///
/// Each path is a resource, so a known path with the wrong method gets a 405
/// instead of falling through to the 404 fallback.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/rick.py").route(web::get().to(legacy_index)))
        .service(web::resource("/quote").route(web::post().to(put_quote)))
        .service(web::resource("/quote/{quoteno}").route(web::get().to(display_quote)))
        .service(web::resource("/list").route(web::get().to(list_all_quotes)))
        .service(web::resource("/search/{keyword}").route(web::get().to(search_for)));
}
