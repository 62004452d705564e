//! Maps a failed agent-interface call onto the error taxonomy.
//!
//! A typed [`ProviderError`] anywhere in the chain wins outright. Without
//! one we fall back to text markers, which is best-effort: provider SDKs
//! put HTTP codes and wording wherever they like. The check order (rate
//! limit, then timeout, then generic 5xx, then generation error) is the
//! deterministic tie-break for messages carrying several markers and must
//! not be reordered.

use crate::models::ErrorKind;
use crate::provider::ProviderError;

/// Never fails and never panics; an unrecognizable failure classifies as
/// a model generation error rather than propagating.
pub fn classify_agent_failure(err: &anyhow::Error) -> ErrorKind {
    for cause in err.chain() {
        if let Some(provider_err) = cause.downcast_ref::<ProviderError>() {
            return match provider_err {
                ProviderError::RateLimited => ErrorKind::ProviderRateLimit,
                ProviderError::Timeout => ErrorKind::ProviderTimeout,
                ProviderError::Api { .. } => ErrorKind::ProviderApiError,
            };
        }
    }

    let text = format!("{err:#}").to_lowercase();
    if text.contains("rate limit") || text.contains("429") {
        ErrorKind::ProviderRateLimit
    } else if text.contains("timeout") || text.contains("502") || text.contains("504") {
        ErrorKind::ProviderTimeout
    } else if ["500", "502", "503", "504"]
        .iter()
        .any(|code| text.contains(code))
    {
        ErrorKind::ProviderApiError
    } else {
        ErrorKind::ModelGenerationError
    }
}
