//! Stable Image control endpoints (v2beta `stable-image/control`)

use reqwest::multipart::Form;

use crate::client::Stability;
use crate::error::{Result, StabilityError};
use crate::image_ref::ImageReference;
use crate::response;
use crate::types::{ApiVersion, ContentResult, OutputFormat};

const RESOURCE: &str = "stable-image/control";

/// Options shared by the sketch, structure and style endpoints
#[derive(Debug, Clone, Default)]
pub struct ControlOptions {
    /// How strongly the input image steers the generation (0..=1)
    pub control_strength: Option<f32>,
    pub negative_prompt: Option<String>,
    pub seed: Option<u64>,
    pub output_format: Option<OutputFormat>,
}

impl ControlOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_control_strength(mut self, strength: f32) -> Self {
        self.control_strength = Some(strength);
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = Some(output_format);
        self
    }
}

impl Stability {
    /// Generate an image guided by the edges of a sketch
    pub async fn control_sketch(
        &self,
        image: &str,
        prompt: &str,
        options: ControlOptions,
    ) -> Result<ContentResult> {
        self.control("sketch", image, prompt, options).await
    }

    /// Generate an image that preserves the structure of the input
    pub async fn control_structure(
        &self,
        image: &str,
        prompt: &str,
        options: ControlOptions,
    ) -> Result<ContentResult> {
        self.control("structure", image, prompt, options).await
    }

    /// Generate an image in the style of the input
    pub async fn control_style(
        &self,
        image: &str,
        prompt: &str,
        options: ControlOptions,
    ) -> Result<ContentResult> {
        self.control("style", image, prompt, options).await
    }

    async fn control(
        &self,
        endpoint: &str,
        image: &str,
        prompt: &str,
        options: ControlOptions,
    ) -> Result<ContentResult> {
        let output_format = options.output_format.unwrap_or_default();
        let mut image_ref = ImageReference::create(image)?;

        let result = async {
            let mut form = Form::new()
                .part("image", image_ref.to_part(self.http_client()).await?)
                .text("prompt", prompt.to_string());
            if let Some(strength) = options.control_strength {
                form = form.text("control_strength", strength.to_string());
            }
            if let Some(negative_prompt) = &options.negative_prompt {
                form = form.text("negative_prompt", negative_prompt.clone());
            }
            if let Some(seed) = options.seed {
                form = form.text("seed", seed.to_string());
            }
            if let Some(format) = options.output_format {
                form = form.text("output_format", format.as_str());
            }

            let url = self.make_url(ApiVersion::V2Beta, RESOURCE, endpoint);
            self.post_form(&url, form, false).await
        }
        .await;

        image_ref.cleanup().await;

        let (status, body) = result?;
        if status == 200 {
            let tag = format!("v2beta_stable_image_control_{endpoint}");
            return response::decode_content(&body, output_format, &tag).await;
        }

        Err(StabilityError::from_status(
            status,
            &format!("Failed to run stable image control {endpoint}"),
            &body,
        ))
    }
}
