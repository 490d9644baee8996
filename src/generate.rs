//! Stable Image generation endpoints (v2beta `stable-image/generate`)

use reqwest::multipart::Form;

use crate::client::Stability;
use crate::error::Result;
use crate::image_ref::ImageReference;
use crate::response;
use crate::types::{ApiVersion, AspectRatio, ContentResult, OutputFormat};

const RESOURCE: &str = "stable-image/generate";

/// Options shared by the Ultra and Core generation endpoints
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub aspect_ratio: Option<AspectRatio>,
    pub negative_prompt: Option<String>,
    pub seed: Option<u64>,
    pub output_format: Option<OutputFormat>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
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

/// SD3 model family selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sd3Model {
    #[default]
    Sd3,
    /// Turbo ignores negative prompts
    Sd3Turbo,
}

impl Sd3Model {
    fn as_str(&self) -> &'static str {
        match self {
            Sd3Model::Sd3 => "sd3",
            Sd3Model::Sd3Turbo => "sd3-turbo",
        }
    }
}

/// Generation mode for SD3; the two variants take mutually exclusive fields
#[derive(Debug, Clone)]
pub enum Sd3Mode {
    TextToImage {
        aspect_ratio: Option<AspectRatio>,
    },
    /// Reinterpret an existing image; `image` may be a URL or a local path
    ImageToImage {
        image: String,
        strength: f32,
    },
}

impl Default for Sd3Mode {
    fn default() -> Self {
        Sd3Mode::TextToImage { aspect_ratio: None }
    }
}

/// Options for the SD3 generation endpoint
#[derive(Debug, Clone, Default)]
pub struct Sd3Options {
    pub model: Sd3Model,
    pub mode: Sd3Mode,
    pub negative_prompt: Option<String>,
    pub seed: Option<u64>,
    /// SD3 only accepts `jpeg` and `png`
    pub output_format: Option<OutputFormat>,
}

impl Sd3Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: Sd3Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_mode(mut self, mode: Sd3Mode) -> Self {
        self.mode = mode;
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
    /// Generate an image with Stable Image Ultra
    ///
    /// # Example
    ///
    /// ```no_run
    /// use stability_ai::{Stability, GenerateOptions, AspectRatio};
    ///
    /// # async fn example() -> stability_ai::Result<()> {
    /// let client = Stability::new("sk-xxx")?;
    ///
    /// let result = client
    ///     .generate_ultra(
    ///         "A lighthouse on a cliff at dawn",
    ///         GenerateOptions::new().with_aspect_ratio(AspectRatio::Ratio16x9),
    ///     )
    ///     .await?;
    ///
    /// println!("{}", result.filepath.display());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn generate_ultra(
        &self,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<ContentResult> {
        self.generate(
            "ultra",
            "v2beta_stable_image_generate_ultra",
            prompt,
            options,
        )
        .await
    }

    /// Generate an image with Stable Image Core
    pub async fn generate_core(
        &self,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<ContentResult> {
        self.generate("core", "v2beta_stable_image_generate_core", prompt, options)
            .await
    }

    /// Generate an image with Stable Diffusion 3, in text-to-image or
    /// image-to-image mode
    pub async fn generate_sd3(&self, prompt: &str, options: Sd3Options) -> Result<ContentResult> {
        let output_format = options.output_format.unwrap_or_default();

        let mut image_ref = match &options.mode {
            Sd3Mode::ImageToImage { image, .. } => Some(ImageReference::create(image)?),
            Sd3Mode::TextToImage { .. } => None,
        };

        let result = self
            .generate_sd3_request(prompt, &options, image_ref.as_mut())
            .await;

        if let Some(reference) = image_ref.as_mut() {
            reference.cleanup().await;
        }

        let (status, body) = result?;
        if status == 200 {
            return response::decode_content(&body, output_format, "v2beta_stable_image_generate_sd3")
                .await;
        }

        Err(crate::error::StabilityError::from_status(
            status,
            "Failed to run stable image generation sd3",
            &body,
        ))
    }

    async fn generate_sd3_request(
        &self,
        prompt: &str,
        options: &Sd3Options,
        image_ref: Option<&mut ImageReference>,
    ) -> Result<(u16, serde_json::Value)> {
        let mut form = Form::new()
            .text("prompt", prompt.to_string())
            .text("model", options.model.as_str());

        match &options.mode {
            Sd3Mode::TextToImage { aspect_ratio } => {
                form = form.text("mode", "text-to-image");
                if let Some(ratio) = aspect_ratio {
                    form = form.text("aspect_ratio", ratio.as_str());
                }
            }
            Sd3Mode::ImageToImage { strength, .. } => {
                form = form.text("mode", "image-to-image");
                form = form.text("strength", strength.to_string());
                if let Some(reference) = image_ref {
                    form = form.part("image", reference.to_part(self.http_client()).await?);
                }
            }
        }

        if options.model != Sd3Model::Sd3Turbo {
            if let Some(negative_prompt) = &options.negative_prompt {
                form = form.text("negative_prompt", negative_prompt.clone());
            }
        }
        if let Some(seed) = options.seed {
            form = form.text("seed", seed.to_string());
        }
        if let Some(output_format) = options.output_format {
            form = form.text("output_format", output_format.as_str());
        }

        let url = self.make_url(ApiVersion::V2Beta, RESOURCE, "sd3");
        self.post_form(&url, form, false).await
    }

    async fn generate(
        &self,
        endpoint: &str,
        tag: &str,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<ContentResult> {
        let output_format = options.output_format.unwrap_or_default();

        let mut form = Form::new().text("prompt", prompt.to_string());
        if let Some(aspect_ratio) = options.aspect_ratio {
            form = form.text("aspect_ratio", aspect_ratio.as_str());
        }
        if let Some(negative_prompt) = options.negative_prompt {
            form = form.text("negative_prompt", negative_prompt);
        }
        if let Some(seed) = options.seed {
            form = form.text("seed", seed.to_string());
        }
        if let Some(format) = options.output_format {
            form = form.text("output_format", format.as_str());
        }

        let url = self.make_url(ApiVersion::V2Beta, RESOURCE, endpoint);
        let (status, body) = self.post_form(&url, form, false).await?;

        if status == 200 {
            return response::decode_content(&body, output_format, tag).await;
        }

        Err(crate::error::StabilityError::from_status(
            status,
            &format!("Failed to run stable image generation {endpoint}"),
            &body,
        ))
    }
}
