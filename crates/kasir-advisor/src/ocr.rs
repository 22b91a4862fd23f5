//! Receipt and invoice extraction through the oracle's vision model.

use kasir_core::OcrOutcome;
use tracing::{debug, warn};

use crate::oracle::{InlineImage, Oracle, OracleRequest};

const EXTRACTION_PROMPT: &str = "Extract the purchase details from this receipt or invoice image. \
Respond with JSON only, using this shape: \
{\"date\": \"YYYY-MM-DD\", \"supplier\": string, \"total\": number, \
\"items\": [{\"name\": string, \"price\": number, \"quantity\": number}]}. \
Omit any field you cannot read. If the image is not a receipt or invoice, respond with \
{\"error\": \"<short reason>\"}.";

/// Reads one image. Never fails: oracle problems come back as
/// [`OcrOutcome::Failed`] carrying the reason.
pub async fn extract_document(oracle: &dyn Oracle, image: InlineImage) -> OcrOutcome {
    debug!(mime_type = %image.mime_type, bytes = image.data.len(), "Extracting document");

    let request = OracleRequest::json(EXTRACTION_PROMPT).with_image(image);
    match oracle.generate(request).await {
        Ok(text) => OcrOutcome::from_response_text(&text),
        Err(e) => {
            warn!(oracle = oracle.name(), error = %e, "Document extraction failed");
            OcrOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}
