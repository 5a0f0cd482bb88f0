//! Gemini API interaction for video-to-article generation.
//!
//! This module talks to the `generateContent` REST endpoint of the Gemini API,
//! asking the model to "watch" a hosted YouTube video and write a long-form
//! analytical article about it.
//!
//! # Architecture
//!
//! - [`resolve_api_key`]: pure, ordered credential lookup over named secrets
//! - [`GenerateArticle`]: trait seam for the generation call, so the
//!   enrichment loop can be driven by a fake in tests
//! - [`GeminiClient`]: the real implementation over `reqwest`
//!
//! # Cost bounding
//!
//! Every request attaches a bounded media reference: only the first 4000
//! seconds of the video, sampled at 0.05 frames per second (one frame every
//! 20 seconds). This keeps the request's token cost predictable regardless of
//! how long the source video is. The call itself has no client-side timeout;
//! it blocks until the service responds or errors, and is never retried.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Credential variables in priority order; the first present wins.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Model used for all generation calls.
const MODEL: &str = "gemini-2.5-pro";

/// Only the first ~66 minutes of the video are considered.
const VIDEO_END_OFFSET: &str = "4000s";

/// One frame every 20 seconds.
const VIDEO_FPS: f64 = 0.05;

/// The fixed analytical prompt sent with every video.
pub const RAPPORTEUR_PROMPT: &str = r#"
**Your Role:** You are a Senior Rapporteur for a premier think tank (e.g., *Chatham House* or *IFRI*). Your audience consists of experts, diplomats, and policymakers who demand substantive analysis, not summaries.

**Your Mission:** For each YouTube link provided, you will use your **built-in video analysis tool** to fetch and process the content. You will then produce an analytical readout in the form of a dense, narrative web article.

**Mandatory Editorial Line:**

* **Intellectual Density:** Every sentence must deliver information or analysis. You must eliminate all "filler," platitudes, and obvious statements.
* **Analytical Style (Not Descriptive):** Do not simply report *who* spoke and *what* they said. Focus on the *meaning* of what was said, the *implications* of the disagreements, and the *scope* of the proposals. Back up your analysis with direct quotes from the speakers.
* **Fluid Prose:** **No bullet points.** The final output must be a single, coherent text structured by thematic paragraphs.

**Required Article Format (Strictly enforce for each video):**

---

**[H1 TITLE: An analytical title that captures the central tension or thesis of the debate - IT MUST START WITH '## ']**
**(Leadin / Introduction)**
[Start with an introductory paragraph (3-4 sentences). Pose the context of the debate and enunciate immediately the primary thesis or the most significant tension that emerged. What did this panel *actually* reveal?]
**(Body of Analysis: 4 to 5 well-written paragraphs that reflects on the debates and discussions)**
[Weave the analysis into dense narrative paragraphs. Quote the speakers. *Do not* use bullet points. Use substantive subtitles as relevant. Remember this has to be extremely well written with full sentences.]
**(Conclusion: end on a strategic takeaway)**
[A final concluding paragraph (2-3 sentences) that answers the "So what?" question. What is the strategic implication of this discussion?]
---
"#;

/// Resolve the API credential from an ordered list of named secrets.
///
/// Takes a lookup function over secret names rather than touching the process
/// environment, so precedence is testable and nothing mutates ambient state.
/// When both variables are present the first wins and a warning notes the
/// ignored one.
pub fn resolve_api_key<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let values: Vec<Option<String>> = API_KEY_VARS.iter().map(|name| lookup(name)).collect();
    if values.iter().filter(|v| v.is_some()).count() > 1 {
        warn!(
            preferred = API_KEY_VARS[0],
            ignored = API_KEY_VARS[1],
            "Both credential variables are set; using the first"
        );
    }
    values.into_iter().flatten().next()
}

/// Trait seam for the article-generation call.
///
/// The enrichment loop is generic over this trait so tests can substitute a
/// canned or failing generator.
pub trait GenerateArticle {
    /// Produce a long-form article for the video at `video_url`.
    async fn generate(&self, video_url: &str) -> Result<GeneratedArticle, Box<dyn Error>>;
}

/// A successful generation result.
#[derive(Debug, Clone)]
pub struct GeneratedArticle {
    /// The model's article text, verbatim.
    pub text: String,
    /// Token accounting, when the service reports it. Observability only.
    pub usage: Option<UsageMetadata>,
}

// --- Wire types for the generateContent REST endpoint ---

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_metadata: Option<VideoMetadata>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    file_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoMetadata {
    start_offset: String,
    end_offset: String,
    fps: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Token counts reported by the service.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
    #[serde(default)]
    pub total_token_count: u64,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GenerateContentResponse {
    /// Pull the first candidate's text, or explain why there is none.
    fn into_article(self) -> Result<GeneratedArticle, Box<dyn Error>> {
        if let Some(error) = self.error {
            return Err(format!("Gemini API error: {}", error.message).into());
        }
        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or("No content returned from Gemini")?;
        Ok(GeneratedArticle {
            text,
            usage: self.usage_metadata,
        })
    }
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Build a client. No timeouts are configured anywhere; a hung request
    /// blocks the job until the service responds.
    pub fn new(api_key: String) -> Result<Self, Box<dyn Error>> {
        let http = reqwest::Client::builder().build()?;
        Ok(GeminiClient {
            http,
            api_key,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        })
    }

    /// Build a request pairing `prompt` with the bounded media reference.
    fn request_body(prompt: &str, video_url: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(prompt.to_string()),
                        file_data: None,
                        video_metadata: None,
                    },
                    Part {
                        text: None,
                        file_data: Some(FileData {
                            file_uri: video_url.to_string(),
                        }),
                        video_metadata: Some(VideoMetadata {
                            start_offset: "0s".to_string(),
                            end_offset: VIDEO_END_OFFSET.to_string(),
                            fps: VIDEO_FPS,
                        }),
                    },
                ],
            }],
        }
    }

    /// Send one generation request with an arbitrary prompt.
    #[instrument(level = "info", skip_all, fields(video_url = %video_url))]
    pub async fn generate_with_prompt(
        &self,
        prompt: &str,
        video_url: &str,
    ) -> Result<GeneratedArticle, Box<dyn Error>> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, MODEL, self.api_key
        );
        let body = Self::request_body(prompt, video_url);

        let t0 = Instant::now();
        let response = self.http.post(&url).json(&body).send().await?;
        let parsed: GenerateContentResponse = response.json().await?;
        let article = parsed.into_article()?;
        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Article generated"
        );

        if let Some(usage) = article.usage {
            info!(
                input = usage.prompt_token_count,
                output = usage.candidates_token_count,
                total = usage.total_token_count,
                "Token usage"
            );
        }
        Ok(article)
    }
}

impl GenerateArticle for GeminiClient {
    async fn generate(&self, video_url: &str) -> Result<GeneratedArticle, Box<dyn Error>> {
        self.generate_with_prompt(RAPPORTEUR_PROMPT, video_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn secrets(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_prefers_first_variable() {
        let vars = secrets(&[("GEMINI_API_KEY", "primary"), ("GOOGLE_API_KEY", "secondary")]);
        let key = resolve_api_key(|name| vars.get(name).cloned());
        assert_eq!(key.as_deref(), Some("primary"));
    }

    #[test]
    fn test_resolve_falls_back_to_second_variable() {
        let vars = secrets(&[("GOOGLE_API_KEY", "secondary")]);
        let key = resolve_api_key(|name| vars.get(name).cloned());
        assert_eq!(key.as_deref(), Some("secondary"));
    }

    #[test]
    fn test_resolve_none_when_unset() {
        let vars = secrets(&[]);
        assert_eq!(resolve_api_key(|name| vars.get(name).cloned()), None);
    }

    #[test]
    fn test_request_body_bounds_the_video() {
        let body = GeminiClient::request_body(RAPPORTEUR_PROMPT, "https://youtu.be/abc");
        let json = serde_json::to_value(&body).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert!(parts[0]["text"].as_str().unwrap().contains("Senior Rapporteur"));
        assert_eq!(parts[1]["fileData"]["fileUri"], "https://youtu.be/abc");
        assert_eq!(parts[1]["videoMetadata"]["startOffset"], "0s");
        assert_eq!(parts[1]["videoMetadata"]["endOffset"], "4000s");
        assert_eq!(parts[1]["videoMetadata"]["fps"], 0.05);
    }

    #[test]
    fn test_response_extracts_first_candidate_text() {
        let raw = r###"{
            "candidates": [
                { "content": { "parts": [{ "text": "## The Article" }] } }
            ],
            "usageMetadata": {
                "promptTokenCount": 120,
                "candidatesTokenCount": 900,
                "totalTokenCount": 1020
            }
        }"###;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let article = parsed.into_article().unwrap();
        assert_eq!(article.text, "## The Article");
        assert_eq!(article.usage.unwrap().total_token_count, 1020);
    }

    #[test]
    fn test_response_surfaces_api_error() {
        let raw = r#"{ "error": { "message": "API key not valid" } }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let err = parsed.into_article().unwrap_err();
        assert!(err.to_string().contains("API key not valid"));
    }

    #[test]
    fn test_response_without_candidates_is_an_error() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.into_article().is_err());
    }
}
