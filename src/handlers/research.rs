use actix_web::{web, HttpResponse};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ErrorKind, ResearchError};
use crate::models::{ReportResponse, SearchRequest};
use crate::AppState;

pub async fn search(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> Result<HttpResponse, ResearchError> {
    if let Err(e) = req.validate() {
        warn!("rejected search request: {}", e);
        return Err(ResearchError::MissingTarget);
    }

    let request_id = Uuid::new_v4();
    let topic = req.topic();
    let span = info_span!("research", %request_id, %topic);

    let report = state
        .research
        .run(topic)
        .instrument(span)
        .await
        .inspect_err(|e| match e.kind() {
            ErrorKind::Client => warn!(%request_id, "research rejected: {}", e),
            ErrorKind::Upstream | ErrorKind::Internal => {
                error!(%request_id, "research failed: {:?}", e)
            }
        })?;

    info!(
        %request_id,
        queries = ?report.queries,
        markdown_bytes = report.markdown.len(),
        html_bytes = report.html.len(),
        "research report ready"
    );
    Ok(HttpResponse::Ok().json(ReportResponse { report: report.html }))
}
