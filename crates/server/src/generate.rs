//! Upload form, deck generation, job status and downloads.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use deck_core::outline::EXAMPLE_OUTLINE;
use deck_core::{ids, DeckRenderer, GenerationJob, PlanOptions};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Prefix of decks generated from the upload form.
pub const DECK_PREFIX: &str = "deck";

const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Result of a successful generation request.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    /// Name of the deck in the output directory.
    pub filename: String,
    pub slide_count: usize,
    pub download_url: String,
    /// Key for `GET /status/<job_id>`.
    pub job_id: String,
}

/// Fields of the generation form.
#[derive(Debug)]
struct GenerateForm {
    outline: String,
    outline_file: Option<String>,
    title_gradient: Option<String>,
    section_gradient: Option<String>,
    use_ai: bool,
}

impl Default for GenerateForm {
    fn default() -> Self {
        Self {
            outline: String::new(),
            outline_file: None,
            title_gradient: None,
            section_gradient: None,
            use_ai: true,
        }
    }
}

impl GenerateForm {
    /// Read a multipart or urlencoded form body.
    async fn extract(request: Request, state: &AppState) -> ApiResult<Self> {
        let urlencoded = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if urlencoded {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(request, state)
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e)))?;
            return Ok(Self::from_fields(fields));
        }

        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e)))?;
        Self::read(multipart).await
    }

    fn from_fields(mut fields: HashMap<String, String>) -> Self {
        Self {
            outline: fields.remove("outline").unwrap_or_default(),
            outline_file: None,
            title_gradient: fields.remove("title_gradient"),
            section_gradient: fields.remove("section_gradient"),
            use_ai: fields.get("use_ai").map_or(true, |value| is_enabled(value)),
        }
    }

    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let invalid = |e: MultipartError| ApiError::bad_request(format!("Invalid form data: {}", e));
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(invalid)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "outline_file" => {
                    // Browsers send an empty, unnamed part when no file is chosen
                    let has_file = field.file_name().is_some_and(|n| !n.is_empty());
                    let bytes = field.bytes().await.map_err(invalid)?;
                    if has_file {
                        form.outline_file = Some(String::from_utf8_lossy(&bytes).into_owned());
                    }
                }
                "outline" => form.outline = field.text().await.map_err(invalid)?,
                "title_gradient" => form.title_gradient = Some(field.text().await.map_err(invalid)?),
                "section_gradient" => {
                    form.section_gradient = Some(field.text().await.map_err(invalid)?)
                }
                "use_ai" => form.use_ai = is_enabled(&field.text().await.map_err(invalid)?),
                other => log::debug!("Ignoring form field '{}'", other),
            }
        }
        Ok(form)
    }

    /// An uploaded file wins over the text field.
    fn outline_text(&self) -> &str {
        self.outline_file.as_deref().unwrap_or(&self.outline)
    }
}

/// Checkbox semantics: only `true` turns the planner on.
fn is_enabled(value: &str) -> bool {
    value.trim() == "true"
}

pub async fn index() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}

pub async fn example_outline() -> Json<Value> {
    Json(json!({ "outline": EXAMPLE_OUTLINE }))
}

pub async fn generate(State(state): State<AppState>, request: Request) -> ApiResult<Json<GenerateResponse>> {
    let form = GenerateForm::extract(request, &state).await?;
    if form.outline_text().trim().is_empty() {
        return Err(ApiError::bad_request("No outline provided"));
    }

    let job_id = ids::short_id();
    state.jobs.insert(job_id.clone(), GenerationJob::planning());

    // Planning and rendering do file I/O and compression
    let response = tokio::task::spawn_blocking(move || {
        let mut progress = GenerationJob::planning().progress;
        run_job(&state, &job_id, &form, &mut progress).inspect_err(|_| {
            state.jobs.update(&job_id, GenerationJob::failed(progress));
        })
    })
    .await
    .map_err(|e| ApiError::internal(format!("Generation task failed: {}", e)))??;

    Ok(Json(response))
}

fn run_job(
    state: &AppState,
    job_id: &str,
    form: &GenerateForm,
    progress: &mut u8,
) -> deck_core::Result<GenerateResponse> {
    let options = PlanOptions {
        use_planner: form.use_ai,
        title_gradient: form.title_gradient.clone(),
        section_gradient: form.section_gradient.clone(),
    };
    let slides = state.planner.prepare(form.outline_text(), &options)?;

    let job = GenerationJob::rendering();
    *progress = job.progress;
    state.jobs.update(job_id, job);

    std::fs::create_dir_all(&state.output_dir)?;
    let filename = format!("{}_{}.pptx", DECK_PREFIX, job_id);
    state
        .renderer
        .render_to_path(&slides, &state.output_dir.join(&filename))?;

    state.jobs.update(job_id, GenerationJob::complete());
    log::info!("Job {} rendered {} slides to {}", job_id, slides.len(), filename);

    Ok(GenerateResponse {
        success: true,
        download_url: format!("/download/{}", filename),
        filename,
        slide_count: slides.len(),
        job_id: job_id.to_string(),
    })
}

pub async fn status(State(state): State<AppState>, Path(job_id): Path<String>) -> Json<Value> {
    let status = state
        .jobs
        .get(&job_id)
        .and_then(|job| serde_json::to_value(job).ok())
        .unwrap_or_else(|| json!({ "status": "unknown", "progress": 0 }));
    Json(status)
}

/// A bare file name: no separators, no parent references.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(|c: char| c == '/' || c == '\\') && !name.contains("..")
}

pub async fn download(State(state): State<AppState>, Path(filename): Path<String>) -> ApiResult<Response> {
    if !is_plain_file_name(&filename) {
        log::warn!("Rejected download of '{}'", filename);
        return Err(ApiError::not_found("File not found"));
    }

    let data = tokio::fs::read(state.output_dir.join(&filename))
        .await
        .map_err(|_| ApiError::not_found("File not found"))?;

    let headers = [
        (header::CONTENT_TYPE, PPTX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];
    Ok((headers, data).into_response())
}
