use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::model::{Job, JobStatus};

// --- SUBMISSION ---

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct ClipRef {
    #[validate(length(min = 1, message = "clip url must not be empty"))]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct MusicRef {
    #[validate(length(min = 1, message = "music url must not be empty"))]
    pub url: Option<String>,
}

/// Style preset. Unknown names are kept verbatim so new presets do not need a
/// deploy on this side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mood {
    #[default]
    Luxury,
    Energetic,
    Calm,
    Cinematic,
    Playful,
    Custom(String),
}

impl From<String> for Mood {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Luxury" => Mood::Luxury,
            "Energetic" => Mood::Energetic,
            "Calm" => Mood::Calm,
            "Cinematic" => Mood::Cinematic,
            "Playful" => Mood::Playful,
            _ => Mood::Custom(s),
        }
    }
}

impl From<Mood> for String {
    fn from(m: Mood) -> Self {
        match m {
            Mood::Luxury => "Luxury".to_string(),
            Mood::Energetic => "Energetic".to_string(),
            Mood::Calm => "Calm".to_string(),
            Mood::Cinematic => "Cinematic".to_string(),
            Mood::Playful => "Playful".to_string(),
            Mood::Custom(s) => s,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(default)]
pub struct RenderParams {
    #[validate(custom(function = "validate_aspect_ratio"))]
    #[schema(example = "9:16")]
    pub aspect_ratio: String,
    #[validate(range(min = 1, max = 3600, message = "target duration must be 1..=3600 seconds"))]
    #[schema(example = 60)]
    pub target_duration_sec: u32,
    #[schema(value_type = String, example = "Luxury")]
    pub mood: Mood,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            aspect_ratio: "9:16".to_string(),
            target_duration_sec: 60,
            mood: Mood::Luxury,
        }
    }
}

/// Everything a caller sends to start a render.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[validate(schema(function = "validate_webhook_scheme"))]
pub struct JobSubmission {
    #[validate(length(min = 1, message = "at least one clip is required"), nested)]
    pub clips: Vec<ClipRef>,
    #[validate(nested)]
    pub music: Option<MusicRef>,
    #[serde(default)]
    #[validate(nested)]
    pub params: RenderParams,
    #[validate(url(message = "webhook_url must be an absolute URL"))]
    pub webhook_url: Option<String>,
}

impl JobSubmission {
    pub fn new(clips: Vec<ClipRef>) -> Self {
        Self {
            clips,
            music: None,
            params: RenderParams::default(),
            webhook_url: None,
        }
    }

    pub fn with_webhook(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }
}

fn validate_aspect_ratio(value: &str) -> Result<(), ValidationError> {
    let valid = value
        .split_once(':')
        .map(|(w, h)| {
            matches!(w.parse::<u32>(), Ok(w) if w > 0) && matches!(h.parse::<u32>(), Ok(h) if h > 0)
        })
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("aspect_ratio");
        err.message = Some("aspect ratio must look like 9:16".into());
        Err(err)
    }
}

fn validate_webhook_scheme(submission: &JobSubmission) -> Result<(), ValidationError> {
    let Some(raw) = submission.webhook_url.as_deref() else {
        return Ok(());
    };

    match url::Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        // Unparseable URLs are already reported by the field-level check.
        Err(_) => Ok(()),
        Ok(_) => {
            let mut err = ValidationError::new("webhook_url");
            err.message = Some("webhook_url must use http or https".into());
            Err(err)
        }
    }
}

// --- RESPONSES ---

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateJobResponse {
    #[schema(example = "J_1a2b3c4d")]
    pub job_id: String,
    pub status: JobStatus,
}

impl From<&Job> for CreateJobResponse {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id().to_string(),
            status: job.status(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobResponse {
    pub status: JobStatus,
    #[schema(minimum = 0, maximum = 100)]
    pub progress: u8,
    pub download_url: Option<String>,
    pub error: Option<String>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            status: job.status(),
            progress: job.progress(),
            download_url: job.result_url().map(str::to_string),
            error: job.error().map(str::to_string),
        }
    }
}
