//! Stable Image editing endpoints (v2beta `stable-image/edit`)

use reqwest::multipart::Form;
use serde_json::Value;

use crate::client::Stability;
use crate::error::{Result, StabilityError};
use crate::image_ref::ImageReference;
use crate::response;
use crate::types::{ApiVersion, ContentResult, JobHandle, OutputFormat};

const RESOURCE: &str = "stable-image/edit";

/// Options for the erase endpoint
#[derive(Debug, Clone, Default)]
pub struct EraseOptions {
    /// URL or local path of the mask image; when omitted the alpha channel
    /// of the input image is used
    pub mask: Option<String>,
    pub seed: Option<u64>,
    pub output_format: Option<OutputFormat>,
}

impl EraseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mask(mut self, mask: impl Into<String>) -> Self {
        self.mask = Some(mask.into());
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

/// Options for the inpaint endpoint
#[derive(Debug, Clone, Default)]
pub struct InpaintOptions {
    pub mask: Option<String>,
    pub negative_prompt: Option<String>,
    pub seed: Option<u64>,
    pub output_format: Option<OutputFormat>,
}

impl InpaintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mask(mut self, mask: impl Into<String>) -> Self {
        self.mask = Some(mask.into());
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

/// Options for the outpaint endpoint; at least one direction must be set
#[derive(Debug, Clone, Default)]
pub struct OutpaintOptions {
    pub left: Option<u32>,
    pub right: Option<u32>,
    pub up: Option<u32>,
    pub down: Option<u32>,
    pub prompt: Option<String>,
    pub seed: Option<u64>,
    pub output_format: Option<OutputFormat>,
}

impl OutpaintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_left(mut self, pixels: u32) -> Self {
        self.left = Some(pixels);
        self
    }

    pub fn with_right(mut self, pixels: u32) -> Self {
        self.right = Some(pixels);
        self
    }

    pub fn with_up(mut self, pixels: u32) -> Self {
        self.up = Some(pixels);
        self
    }

    pub fn with_down(mut self, pixels: u32) -> Self {
        self.down = Some(pixels);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
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

    fn has_direction(&self) -> bool {
        self.left.is_some() || self.right.is_some() || self.up.is_some() || self.down.is_some()
    }
}

/// Options for the search-and-replace endpoint
#[derive(Debug, Clone, Default)]
pub struct SearchAndReplaceOptions {
    pub negative_prompt: Option<String>,
    pub seed: Option<u64>,
    pub output_format: Option<OutputFormat>,
}

impl SearchAndReplaceOptions {
    pub fn new() -> Self {
        Self::default()
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

/// Light source direction for replace-background-and-relight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightDirection {
    Above,
    Below,
    Left,
    Right,
}

impl LightDirection {
    fn as_str(&self) -> &'static str {
        match self {
            LightDirection::Above => "above",
            LightDirection::Below => "below",
            LightDirection::Left => "left",
            LightDirection::Right => "right",
        }
    }
}

/// Options for the replace-background-and-relight endpoint.
///
/// Upstream requires either `background_prompt` or `background_reference`.
#[derive(Debug, Clone, Default)]
pub struct RelightOptions {
    pub background_prompt: Option<String>,
    /// URL or local path of a background reference image
    pub background_reference: Option<String>,
    pub foreground_prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub preserve_original_subject: Option<f32>,
    pub original_background_depth: Option<f32>,
    pub keep_original_background: Option<bool>,
    pub light_source_direction: Option<LightDirection>,
    /// URL or local path of a lighting reference image
    pub light_reference: Option<String>,
    pub light_source_strength: Option<f32>,
    pub seed: Option<u64>,
    pub output_format: Option<OutputFormat>,
}

impl RelightOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.background_prompt = Some(prompt.into());
        self
    }

    pub fn with_background_reference(mut self, reference: impl Into<String>) -> Self {
        self.background_reference = Some(reference.into());
        self
    }

    pub fn with_foreground_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.foreground_prompt = Some(prompt.into());
        self
    }

    pub fn with_negative_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(prompt.into());
        self
    }

    pub fn with_light_source_direction(mut self, direction: LightDirection) -> Self {
        self.light_source_direction = Some(direction);
        self
    }

    pub fn with_light_reference(mut self, reference: impl Into<String>) -> Self {
        self.light_reference = Some(reference.into());
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
    /// Erase masked regions from an image
    ///
    /// `image` may be a public URL or a local file path.
    pub async fn erase(&self, image: &str, options: EraseOptions) -> Result<ContentResult> {
        let output_format = options.output_format.unwrap_or_default();
        let mut image_ref = ImageReference::create(image)?;
        let mut mask_ref = options
            .mask
            .as_deref()
            .map(ImageReference::create)
            .transpose()?;

        let result = async {
            let mut form = Form::new()
                .part("image", image_ref.to_part(self.http_client()).await?);
            if let Some(mask) = mask_ref.as_mut() {
                form = form.part("mask", mask.to_part(self.http_client()).await?);
            }
            if let Some(seed) = options.seed {
                form = form.text("seed", seed.to_string());
            }
            if let Some(format) = options.output_format {
                form = form.text("output_format", format.as_str());
            }

            let url = self.make_url(ApiVersion::V2Beta, RESOURCE, "erase");
            self.post_form(&url, form, false).await
        }
        .await;

        image_ref.cleanup().await;
        if let Some(mask) = mask_ref.as_mut() {
            mask.cleanup().await;
        }

        self.finish_edit(result?, output_format, "v2beta_stable_image_edit_erase", "erase")
            .await
    }

    /// Inpaint an image guided by a prompt, optionally constrained by a mask
    pub async fn inpaint(
        &self,
        image: &str,
        prompt: &str,
        options: InpaintOptions,
    ) -> Result<ContentResult> {
        let output_format = options.output_format.unwrap_or_default();
        let mut image_ref = ImageReference::create(image)?;
        let mut mask_ref = options
            .mask
            .as_deref()
            .map(ImageReference::create)
            .transpose()?;

        let result = async {
            let mut form = Form::new()
                .part("image", image_ref.to_part(self.http_client()).await?)
                .text("prompt", prompt.to_string());
            if let Some(mask) = mask_ref.as_mut() {
                form = form.part("mask", mask.to_part(self.http_client()).await?);
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

            let url = self.make_url(ApiVersion::V2Beta, RESOURCE, "inpaint");
            self.post_form(&url, form, false).await
        }
        .await;

        image_ref.cleanup().await;
        if let Some(mask) = mask_ref.as_mut() {
            mask.cleanup().await;
        }

        self.finish_edit(
            result?,
            output_format,
            "v2beta_stable_image_edit_inpaint",
            "inpaint",
        )
        .await
    }

    /// Extend an image in one or more directions
    pub async fn outpaint(&self, image: &str, options: OutpaintOptions) -> Result<ContentResult> {
        if !options.has_direction() {
            return Err(StabilityError::invalid_input(
                "outpaint requires at least one of left, right, up, down",
            ));
        }

        let output_format = options.output_format.unwrap_or_default();
        let mut image_ref = ImageReference::create(image)?;

        let result = async {
            let mut form = Form::new()
                .part("image", image_ref.to_part(self.http_client()).await?);
            for (name, value) in [
                ("left", options.left),
                ("right", options.right),
                ("up", options.up),
                ("down", options.down),
            ] {
                if let Some(pixels) = value {
                    form = form.text(name, pixels.to_string());
                }
            }
            if let Some(prompt) = &options.prompt {
                form = form.text("prompt", prompt.clone());
            }
            if let Some(seed) = options.seed {
                form = form.text("seed", seed.to_string());
            }
            if let Some(format) = options.output_format {
                form = form.text("output_format", format.as_str());
            }

            let url = self.make_url(ApiVersion::V2Beta, RESOURCE, "outpaint");
            self.post_form(&url, form, false).await
        }
        .await;

        image_ref.cleanup().await;

        self.finish_edit(
            result?,
            output_format,
            "v2beta_stable_image_edit_outpaint",
            "outpaint",
        )
        .await
    }

    /// Replace objects matched by a search prompt with generated content
    pub async fn search_and_replace(
        &self,
        image: &str,
        prompt: &str,
        search_prompt: &str,
        options: SearchAndReplaceOptions,
    ) -> Result<ContentResult> {
        let output_format = options.output_format.unwrap_or_default();
        let mut image_ref = ImageReference::create(image)?;

        let result = async {
            let mut form = Form::new()
                .part("image", image_ref.to_part(self.http_client()).await?)
                .text("prompt", prompt.to_string())
                .text("search_prompt", search_prompt.to_string());
            if let Some(negative_prompt) = &options.negative_prompt {
                form = form.text("negative_prompt", negative_prompt.clone());
            }
            if let Some(seed) = options.seed {
                form = form.text("seed", seed.to_string());
            }
            if let Some(format) = options.output_format {
                form = form.text("output_format", format.as_str());
            }

            let url = self.make_url(ApiVersion::V2Beta, RESOURCE, "search-and-replace");
            self.post_form(&url, form, false).await
        }
        .await;

        image_ref.cleanup().await;

        self.finish_edit(
            result?,
            output_format,
            "v2beta_stable_image_edit_search_and_replace",
            "search and replace",
        )
        .await
    }

    /// Remove the background from an image
    pub async fn remove_background(
        &self,
        image: &str,
        output_format: Option<OutputFormat>,
    ) -> Result<ContentResult> {
        let format = output_format.unwrap_or_default();
        let mut image_ref = ImageReference::create(image)?;

        let result = async {
            let mut form = Form::new()
                .part("image", image_ref.to_part(self.http_client()).await?);
            if let Some(format) = output_format {
                form = form.text("output_format", format.as_str());
            }

            let url = self.make_url(ApiVersion::V2Beta, RESOURCE, "remove-background");
            self.post_form(&url, form, false).await
        }
        .await;

        image_ref.cleanup().await;

        self.finish_edit(
            result?,
            format,
            "v2beta_stable_image_edit_remove_background",
            "remove background",
        )
        .await
    }

    /// Submit a replace-background-and-relight job.
    ///
    /// Asynchronous: the response acknowledges the submission with a job id;
    /// resolve it with [`fetch_async_result`](Stability::fetch_async_result).
    pub async fn replace_background_and_relight(
        &self,
        image: &str,
        options: RelightOptions,
    ) -> Result<JobHandle> {
        let mut subject_ref = ImageReference::create(image)?;
        let mut background_ref = options
            .background_reference
            .as_deref()
            .map(ImageReference::create)
            .transpose()?;
        let mut light_ref = options
            .light_reference
            .as_deref()
            .map(ImageReference::create)
            .transpose()?;

        let result = async {
            let mut form = Form::new().part(
                "subject_image",
                subject_ref.to_part(self.http_client()).await?,
            );
            if let Some(background) = background_ref.as_mut() {
                form = form.part(
                    "background_reference",
                    background.to_part(self.http_client()).await?,
                );
            }
            if let Some(prompt) = &options.background_prompt {
                form = form.text("background_prompt", prompt.clone());
            }
            if let Some(prompt) = &options.foreground_prompt {
                form = form.text("foreground_prompt", prompt.clone());
            }
            if let Some(prompt) = &options.negative_prompt {
                form = form.text("negative_prompt", prompt.clone());
            }
            if let Some(value) = options.preserve_original_subject {
                form = form.text("preserve_original_subject", value.to_string());
            }
            if let Some(value) = options.original_background_depth {
                form = form.text("original_background_depth", value.to_string());
            }
            if let Some(value) = options.keep_original_background {
                form = form.text("keep_original_background", value.to_string());
            }
            if let Some(direction) = options.light_source_direction {
                form = form.text("light_source_direction", direction.as_str());
            }
            if let Some(light) = light_ref.as_mut() {
                form = form.part(
                    "light_reference",
                    light.to_part(self.http_client()).await?,
                );
            }
            if let Some(value) = options.light_source_strength {
                form = form.text("light_source_strength", value.to_string());
            }
            if let Some(seed) = options.seed {
                form = form.text("seed", seed.to_string());
            }
            if let Some(format) = options.output_format {
                form = form.text("output_format", format.as_str());
            }

            let url = self.make_url(ApiVersion::V2Beta, RESOURCE, "replace-background-and-relight");
            self.post_form(&url, form, false).await
        }
        .await;

        subject_ref.cleanup().await;
        if let Some(background) = background_ref.as_mut() {
            background.cleanup().await;
        }
        if let Some(light) = light_ref.as_mut() {
            light.cleanup().await;
        }

        let (status, body) = result?;
        let id = response::expect_job_id(
            status,
            &body,
            "Failed to run stable image replace background and relight",
        )?;
        Ok(JobHandle { id })
    }

    async fn finish_edit(
        &self,
        (status, body): (u16, Value),
        output_format: OutputFormat,
        tag: &str,
        operation: &str,
    ) -> Result<ContentResult> {
        if status == 200 {
            return response::decode_content(&body, output_format, tag).await;
        }

        Err(StabilityError::from_status(
            status,
            &format!("Failed to run stable image {operation}"),
            &body,
        ))
    }
}
