//! Axum route handlers for the wizard.

use async_trait::async_trait;
use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::FormRejection,
        FromRequest, Request, State,
    },
    http::{header::CONTENT_TYPE, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use minijinja::context;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::errors::{AppError, PageError};
use crate::flow::upload::{receive_resume, ExtractedResume, UploadError};
use crate::flow::{
    require, validate_job_description, validate_question, Step, FALLBACK_ANSWER,
    INVALID_BODY_MESSAGE, UPLOAD_SUCCESS_MESSAGE,
};
use crate::render::{render_page, Page};
use crate::session::{Session, SessionData};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JobForm {
    #[serde(default)]
    pub job: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuestionBody {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// The `question` field from either a JSON body or a form body.
///
/// A non-JSON body that is not a form reads as an empty question.
pub struct QuestionInput(pub String);

#[async_trait]
impl<S> FromRequest<S> for QuestionInput
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(is_json_content_type);

        let body = if is_json {
            let Json(body) = Json::<QuestionBody>::from_request(req, state)
                .await
                .map_err(|rejection| {
                    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                        return AppError::PayloadTooLarge;
                    }
                    warn!("Rejected chat body: {rejection}");
                    AppError::Validation(INVALID_BODY_MESSAGE.to_string())
                })?;
            body
        } else {
            match Form::<QuestionBody>::from_request(req, state).await {
                Ok(Form(body)) => body,
                Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                    return Err(AppError::PayloadTooLarge);
                }
                Err(_) => QuestionBody::default(),
            }
        };

        Ok(QuestionInput(body.question))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// `application/json`, or any `application/*+json` type, with optional parameters.
fn is_json_content_type(value: &str) -> bool {
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match mime.strip_prefix("application/") {
        Some(subtype) => subtype == "json" || subtype.ends_with("+json"),
        None => false,
    }
}

fn upload_page_with(error: Option<&str>) -> Result<Html<String>, PageError> {
    Ok(render_page(Page::Upload, context! { error => error })?)
}

fn job_page_with(data: &SessionData, error: Option<&str>) -> Result<Html<String>, PageError> {
    Ok(render_page(
        Page::Job,
        context! {
            error => error,
            filename => data.resume_filename.as_deref(),
            job => data.job_text.as_deref(),
        },
    )?)
}

async fn store_resume(
    mut session: Session,
    resume: ExtractedResume,
    state: &AppState,
) -> anyhow::Result<axum_extra::extract::cookie::SignedCookieJar> {
    session.data.resume_text = Some(resume.text);
    session.data.resume_filename = Some(resume.filename);
    session.save(state.sessions.as_ref()).await
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn upload_page() -> Result<Html<String>, PageError> {
    upload_page_with(None)
}

/// POST /
///
/// Form upload. Guard failures re-render the upload page with the reason.
pub async fn handle_upload_form(
    State(state): State<AppState>,
    session: Session,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, PageError> {
    match receive_resume(multipart).await {
        Ok(resume) => {
            let jar = store_resume(session, resume, &state).await?;
            Ok((jar, Redirect::to(Step::AwaitingJob.path())).into_response())
        }
        Err(UploadError::TooLarge) => Err(AppError::PayloadTooLarge.into()),
        Err(err) => {
            if let UploadError::Processing(e) = &err {
                error!("Error processing file: {e:?}");
            }
            Ok(upload_page_with(Some(err.message()))?.into_response())
        }
    }
}

/// POST /upload
///
/// Programmatic upload. Same guards as the form, JSON responses.
pub async fn handle_upload(
    State(state): State<AppState>,
    session: Session,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let resume = receive_resume(multipart).await?;
    let jar = store_resume(session, resume, &state).await?;
    Ok((
        jar,
        Json(UploadResponse {
            success: true,
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        }),
    )
        .into_response())
}

/// GET /job
pub async fn job_page(session: Session) -> Result<Response, PageError> {
    if let Err(redirect) = require(&session.data, Step::AwaitingJob) {
        return Ok(redirect.into_response());
    }
    Ok(job_page_with(&session.data, None)?.into_response())
}

/// POST /job
pub async fn handle_job(
    State(state): State<AppState>,
    mut session: Session,
    form: Result<Form<JobForm>, FormRejection>,
) -> Result<Response, PageError> {
    if let Err(redirect) = require(&session.data, Step::AwaitingJob) {
        return Ok(redirect.into_response());
    }

    let raw = match form {
        Ok(Form(form)) => form.job,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(AppError::PayloadTooLarge.into());
        }
        Err(_) => String::new(),
    };
    match validate_job_description(&raw) {
        Ok(job) => {
            session.data.job_text = Some(job);
            let jar = session.save(state.sessions.as_ref()).await?;
            Ok((jar, Redirect::to(Step::Chatting.path())).into_response())
        }
        Err(AppError::Validation(message)) => {
            Ok(job_page_with(&session.data, Some(&message))?.into_response())
        }
        Err(other) => Err(other.into()),
    }
}

/// GET /chat
pub async fn chat_page(session: Session) -> Result<Response, PageError> {
    if let Err(redirect) = require(&session.data, Step::Chatting) {
        return Ok(redirect.into_response());
    }
    let html = render_page(
        Page::Chat,
        context! { filename => session.data.resume_filename.as_deref() },
    )?;
    Ok(html.into_response())
}

/// POST /chat
///
/// Answers one question. Upstream failures become `FALLBACK_ANSWER`, never an error status.
pub async fn handle_chat(
    State(state): State<AppState>,
    session: Session,
    input: Result<QuestionInput, AppError>,
) -> Result<Response, AppError> {
    let (Some(resume), Some(job)) = (
        session.data.resume_text.as_deref(),
        session.data.job_text.as_deref(),
    ) else {
        let step = Step::of(&session.data);
        return Ok(Redirect::to(step.path()).into_response());
    };

    let QuestionInput(raw) = input?;
    let question = validate_question(&raw)?;

    let answer = match state.llm.ask(resume, job, question).await {
        Ok(answer) => answer,
        Err(e) => {
            error!("Error with LLM: {e}");
            FALLBACK_ANSWER.to_string()
        }
    };

    Ok(Json(AnswerResponse { answer }).into_response())
}

/// GET /reset_job
///
/// Drops the job description and returns to the job step; the resume stays.
pub async fn handle_reset_job(
    State(state): State<AppState>,
    mut session: Session,
) -> Result<Response, PageError> {
    session.data.job_text = None;
    let jar = session.save(state.sessions.as_ref()).await?;
    Ok((jar, Redirect::to(Step::AwaitingJob.path())).into_response())
}

/// GET /reset
pub async fn handle_reset(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, PageError> {
    let jar = session.clear(state.sessions.as_ref()).await?;
    Ok((jar, Redirect::to(Step::Start.path())).into_response())
}
