//! Route handlers
//!
//! One async function per [`Route`]. A handler either returns its full response or
//! fails with a [`HandlerError`]; it never builds an error response itself, with the
//! single exception of the 405 answer of POST-only routes.

use chrono::Local;
use hyper::body::Bytes;
use hyper::Method;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::dates::{days_until, parse_calendar_datetime, parse_target_date, WEDDING_DATE};
use super::error::HandlerError;
use super::request::WebhookRequest;
use super::routes::Route;
use crate::http::{self, query_to_json, HttpResponse};
use crate::outbound::{EventPayload, Notifier};

/// IFTTT event names
pub const NOTIFY_EVENT: &str = "notify";
pub const DEBUG_EVENT: &str = "dropbox-debug";
pub const TELEGRAM_EVENT: &str = "telegram_afb";
pub const TRELLO_EVENT: &str = "add_cleaning_trello";

/// Calendar description handles and the names announced for them
const USER_NAMES: &[(&str, &str)] = &[("@fffergal", "Fergal"), ("@annaarmstrong11", "Anna")];

pub fn display_name(handle: &str) -> Option<&'static str> {
    USER_NAMES
        .iter()
        .find(|(known, _)| *known == handle)
        .map(|(_, name)| *name)
}

/// Everything handlers need besides the request
#[derive(Clone)]
pub struct HandlerContext {
    pub notifier: Arc<dyn Notifier>,
    /// Current error log file, forwarded by `/v1/dropbox-log`
    pub log_path: PathBuf,
}

impl HandlerContext {
    pub fn new(notifier: Arc<dyn Notifier>, log_path: PathBuf) -> Self {
        Self { notifier, log_path }
    }
}

/// Run the handler bound to `route`
pub async fn handle(
    route: Route,
    ctx: &HandlerContext,
    req: &WebhookRequest,
) -> Result<HttpResponse, HandlerError> {
    match route {
        Route::Wedding => wedding(ctx).await,
        Route::Debug => debug(req),
        Route::DropboxDebug => dropbox_debug(ctx, req).await,
        Route::DropboxLog => dropbox_log(ctx).await,
        Route::DaysUntil => days_until_route(ctx, req).await,
        Route::CleaningFromGcal => cleaning_from_gcal(ctx, req).await,
        Route::ErrorDebug => Err(HandlerError::Deliberate),
    }
}

async fn notify(
    ctx: &HandlerContext,
    event: &str,
    payload: EventPayload,
) -> Result<Bytes, HandlerError> {
    Ok(ctx.notifier.trigger(event, &payload).await?)
}

async fn wedding(ctx: &HandlerContext) -> Result<HttpResponse, HandlerError> {
    let days = days_until(
        Local::now().naive_local(),
        WEDDING_DATE.and_time(chrono::NaiveTime::MIN),
    );
    let upstream = notify(
        ctx,
        NOTIFY_EVENT,
        EventPayload::new(format!("{days} days until wedding.")),
    )
    .await?;
    Ok(http::build_text_response([upstream]))
}

fn debug(req: &WebhookRequest) -> Result<HttpResponse, HandlerError> {
    if req.method != Method::POST {
        return Ok(http::build_json_response(query_to_json(&req.query_params())));
    }
    Ok(http::build_text_response([req.read_body()?]))
}

async fn dropbox_debug(
    ctx: &HandlerContext,
    req: &WebhookRequest,
) -> Result<HttpResponse, HandlerError> {
    let payload = if req.method == Method::POST {
        req.read_text()?
    } else {
        query_to_json(&req.query_params())
    };
    let upstream = notify(ctx, DEBUG_EVENT, EventPayload::new(payload)).await?;
    Ok(http::build_text_response([upstream]))
}

async fn dropbox_log(ctx: &HandlerContext) -> Result<HttpResponse, HandlerError> {
    let content = tokio::fs::read_to_string(&ctx.log_path)
        .await
        .map_err(|source| HandlerError::LogFile {
            path: ctx.log_path.clone(),
            source,
        })?;
    let upstream = notify(ctx, DEBUG_EVENT, EventPayload::new(content)).await?;
    Ok(http::build_text_response([upstream]))
}

#[derive(Debug, Deserialize)]
struct DaysUntilRequest {
    from_date: String,
    target_date: String,
    target_label: String,
}

async fn days_until_route(
    ctx: &HandlerContext,
    req: &WebhookRequest,
) -> Result<HttpResponse, HandlerError> {
    if req.method != Method::POST {
        return Ok(http::build_405_response());
    }
    let body: DaysUntilRequest = req.json_body()?;
    let from = parse_calendar_datetime("from_date", &body.from_date)?;
    let target = parse_target_date("target_date", &body.target_date)?;
    let days = days_until(from, target);

    let upstream = notify(
        ctx,
        NOTIFY_EVENT,
        EventPayload::new(format!("{days} days until {}.", body.target_label)),
    )
    .await?;
    Ok(http::build_text_response([upstream]))
}

#[derive(Debug, Deserialize)]
struct CleaningRequest {
    datetime: String,
    title: String,
    /// User handle of the person on duty
    description: String,
}

async fn cleaning_from_gcal(
    ctx: &HandlerContext,
    req: &WebhookRequest,
) -> Result<HttpResponse, HandlerError> {
    if req.method != Method::POST {
        return Ok(http::build_405_response());
    }
    let body: CleaningRequest = req.json_body()?;
    let when = parse_calendar_datetime("datetime", &body.datetime)?;
    let name = display_name(&body.description)
        .ok_or_else(|| HandlerError::UnknownUser(body.description.clone()))?;

    let announced = notify(
        ctx,
        TELEGRAM_EVENT,
        EventPayload::new(format!("{name}: {}", body.title)),
    )
    .await?;
    let task = notify(
        ctx,
        TRELLO_EVENT,
        EventPayload::new(format!("{} ({})", body.title, when.format("%a %d %b")))
            .with_value2(&body.description),
    )
    .await?;
    Ok(http::build_text_response([announced, task]))
}
