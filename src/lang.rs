/// Sentinel for text whose language could not be determined. Distinct from
/// absence: a record always carries some language value.
pub const UNKNOWN: &str = "unknown";

/// Best-effort language identification.
///
/// Anything shorter than ten characters after trimming is too little signal
/// to classify and comes back as [`UNKNOWN`], as does text whatlang cannot
/// place. Total: never fails.
pub fn detect(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() < 10 {
        return UNKNOWN.to_string();
    }
    match whatlang::detect(text) {
        Some(info) => info.lang().code().to_string(),
        None => UNKNOWN.to_string(),
    }
}
