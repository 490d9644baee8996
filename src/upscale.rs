//! Stable Image upscale endpoints (v2beta `stable-image/upscale`)

use reqwest::multipart::Form;

use crate::client::Stability;
use crate::error::{Result, StabilityError};
use crate::image_ref::ImageReference;
use crate::response;
use crate::types::{ApiVersion, AsyncResult, ContentResult, CreativeUpscaleHandle, OutputFormat};

const RESOURCE: &str = "stable-image/upscale";

/// Options shared by the conservative and creative upscale endpoints
#[derive(Debug, Clone, Default)]
pub struct UpscaleOptions {
    pub negative_prompt: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub seed: Option<u64>,
    /// How much creative latitude the upscaler gets (0..=0.35)
    pub creativity: Option<f32>,
}

impl UpscaleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = Some(output_format);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_creativity(mut self, creativity: f32) -> Self {
        self.creativity = Some(creativity);
        self
    }
}

impl Stability {
    /// Upscale an image while staying close to the original (synchronous)
    pub async fn upscale_conservative(
        &self,
        image: &str,
        prompt: &str,
        options: UpscaleOptions,
    ) -> Result<ContentResult> {
        let output_format = options.output_format.unwrap_or_default();
        let mut image_ref = ImageReference::create(image)?;

        let result = self
            .upscale_request("conservative", &mut image_ref, prompt, &options)
            .await;
        image_ref.cleanup().await;

        let (status, body) = result?;
        if status == 200 {
            return response::decode_content(
                &body,
                output_format,
                "v2beta_stable_image_upscale_conservative",
            )
            .await;
        }

        Err(StabilityError::from_status(
            status,
            "Failed to perform conservative upscale",
            &body,
        ))
    }

    /// Start a creative upscale job.
    ///
    /// The returned handle carries the requested output format, which the
    /// result endpoint does not remember; pass the whole handle to
    /// [`fetch_creative_upscale_result`](Stability::fetch_creative_upscale_result).
    pub async fn start_creative_upscale(
        &self,
        image: &str,
        prompt: &str,
        options: UpscaleOptions,
    ) -> Result<CreativeUpscaleHandle> {
        let output_format = options.output_format.unwrap_or_default();
        let mut image_ref = ImageReference::create(image)?;

        let result = self
            .upscale_request("creative", &mut image_ref, prompt, &options)
            .await;
        image_ref.cleanup().await;

        let (status, body) = result?;
        let id = response::expect_job_id(status, &body, "Failed to start creative upscale")?;
        Ok(CreativeUpscaleHandle { id, output_format })
    }

    /// Poll a creative upscale job for its terminal result
    ///
    /// # Example
    ///
    /// ```no_run
    /// use stability_ai::{AsyncResult, Stability, UpscaleOptions};
    /// use std::time::Duration;
    ///
    /// # async fn example() -> stability_ai::Result<()> {
    /// let client = Stability::new("sk-xxx")?;
    /// let handle = client
    ///     .start_creative_upscale("https://example.com/photo.png", "sharp detail", UpscaleOptions::new())
    ///     .await?;
    ///
    /// let content = loop {
    ///     match client.fetch_creative_upscale_result(&handle).await? {
    ///         AsyncResult::Content(content) => break content,
    ///         AsyncResult::InProgress(_) => {
    ///             tokio::time::sleep(Duration::from_millis(2500)).await;
    ///         }
    ///     }
    /// };
    /// println!("{}", content.filepath.display());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_creative_upscale_result(
        &self,
        handle: &CreativeUpscaleHandle,
    ) -> Result<AsyncResult> {
        let url = format!(
            "{}/{}",
            self.make_url(ApiVersion::V2Beta, RESOURCE, "creative/result"),
            handle.id
        );
        let (status, body) = self.get_json(&url, false).await?;

        response::interpret_poll(
            status,
            &body,
            handle.output_format,
            "v2beta_stable_image_upscale_creative",
            "Failed to fetch creative upscale result",
        )
        .await
    }

    async fn upscale_request(
        &self,
        endpoint: &str,
        image_ref: &mut ImageReference,
        prompt: &str,
        options: &UpscaleOptions,
    ) -> Result<(u16, serde_json::Value)> {
        let mut form = Form::new()
            .part("image", image_ref.to_part(self.http_client()).await?)
            .text("prompt", prompt.to_string());
        if let Some(negative_prompt) = &options.negative_prompt {
            form = form.text("negative_prompt", negative_prompt.clone());
        }
        if let Some(format) = options.output_format {
            form = form.text("output_format", format.as_str());
        }
        if let Some(seed) = options.seed {
            form = form.text("seed", seed.to_string());
        }
        if let Some(creativity) = options.creativity {
            form = form.text("creativity", creativity.to_string());
        }

        let url = self.make_url(ApiVersion::V2Beta, RESOURCE, endpoint);
        self.post_form(&url, form, false).await
    }
}
