use axum::Json;
use serde::Serialize;

/// Languages the XTTS model speaks, as (code, name).
const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("pl", "Polish"),
    ("tr", "Turkish"),
    ("ru", "Russian"),
    ("nl", "Dutch"),
    ("cs", "Czech"),
    ("ar", "Arabic"),
    ("zh-cn", "Chinese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("hu", "Hungarian"),
];

#[derive(Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

#[derive(Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<Language>,
}

pub async fn get_languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: LANGUAGES
            .iter()
            .map(|&(code, name)| Language { code, name })
            .collect(),
    })
}
