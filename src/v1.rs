//! Legacy v1 generation endpoints (`v1/generation`)
//!
//! These endpoints answer with an `artifacts` array where every artifact is
//! an independently decodable base64 image, so each call fans out into a
//! `Vec<ContentResult>`.

use reqwest::multipart::Form;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::client::Stability;
use crate::error::{Result, StabilityError};
use crate::image_ref::ImageReference;
use crate::response;
use crate::types::{ApiVersion, ContentResult, OutputFormat};

const RESOURCE: &str = "generation";

/// A weighted text prompt
#[derive(Debug, Clone, Serialize)]
pub struct TextPrompt {
    pub text: String,
    pub weight: f32,
}

impl TextPrompt {
    pub fn new(text: impl Into<String>, weight: f32) -> Self {
        Self {
            text: text.into(),
            weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipGuidancePreset {
    FastBlue,
    FastGreen,
    None,
    Simple,
    Slow,
    Slower,
    Slowest,
}

impl ClipGuidancePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipGuidancePreset::FastBlue => "FAST_BLUE",
            ClipGuidancePreset::FastGreen => "FAST_GREEN",
            ClipGuidancePreset::None => "NONE",
            ClipGuidancePreset::Simple => "SIMPLE",
            ClipGuidancePreset::Slow => "SLOW",
            ClipGuidancePreset::Slower => "SLOWER",
            ClipGuidancePreset::Slowest => "SLOWEST",
        }
    }
}

impl Serialize for ClipGuidancePreset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampler {
    Ddim,
    Ddpm,
    KDpmpp2m,
    KDpmpp2sAncestral,
    KDpm2,
    KDpm2Ancestral,
    KEuler,
    KEulerAncestral,
    KHeun,
    KLms,
}

impl Sampler {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sampler::Ddim => "DDIM",
            Sampler::Ddpm => "DDPM",
            Sampler::KDpmpp2m => "K_DPMPP_2M",
            Sampler::KDpmpp2sAncestral => "K_DPMPP_2S_ANCESTRAL",
            Sampler::KDpm2 => "K_DPM_2",
            Sampler::KDpm2Ancestral => "K_DPM_2_ANCESTRAL",
            Sampler::KEuler => "K_EULER",
            Sampler::KEulerAncestral => "K_EULER_ANCESTRAL",
            Sampler::KHeun => "K_HEUN",
            Sampler::KLms => "K_LMS",
        }
    }
}

impl Serialize for Sampler {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylePreset {
    ThreeDModel,
    AnalogFilm,
    Anime,
    Cinematic,
    ComicBook,
    DigitalArt,
    Enhance,
    FantasyArt,
    Isometric,
    LineArt,
    LowPoly,
    ModelingCompound,
    NeonPunk,
    Origami,
    Photographic,
    PixelArt,
    TileTexture,
}

impl StylePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            StylePreset::ThreeDModel => "3d-model",
            StylePreset::AnalogFilm => "analog-film",
            StylePreset::Anime => "anime",
            StylePreset::Cinematic => "cinematic",
            StylePreset::ComicBook => "comic-book",
            StylePreset::DigitalArt => "digital-art",
            StylePreset::Enhance => "enhance",
            StylePreset::FantasyArt => "fantasy-art",
            StylePreset::Isometric => "isometric",
            StylePreset::LineArt => "line-art",
            StylePreset::LowPoly => "low-poly",
            StylePreset::ModelingCompound => "modeling-compound",
            StylePreset::NeonPunk => "neon-punk",
            StylePreset::Origami => "origami",
            StylePreset::Photographic => "photographic",
            StylePreset::PixelArt => "pixel-art",
            StylePreset::TileTexture => "tile-texture",
        }
    }
}

impl Serialize for StylePreset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Options shared by all v1 generation endpoints
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_guidance_preset: Option<ClipGuidancePreset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampler: Option<Sampler>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_preset: Option<StylePreset>,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cfg_scale(mut self, cfg_scale: f32) -> Self {
        self.cfg_scale = Some(cfg_scale);
        self
    }

    pub fn with_clip_guidance_preset(mut self, preset: ClipGuidancePreset) -> Self {
        self.clip_guidance_preset = Some(preset);
        self
    }

    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn with_style_preset(mut self, preset: StylePreset) -> Self {
        self.style_preset = Some(preset);
        self
    }
}

/// Options for the v1 text-to-image endpoint
#[derive(Debug, Clone, Default, Serialize)]
pub struct TextToImageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(flatten)]
    pub generation: GenerationOptions,
}

impl TextToImageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_generation(mut self, generation: GenerationOptions) -> Self {
        self.generation = generation;
        self
    }
}

/// How the init image constrains an image-to-image generation
#[derive(Debug, Clone)]
pub enum InitImageMode {
    ImageStrength { image_strength: Option<f32> },
    StepSchedule { start: Option<f32>, end: Option<f32> },
}

impl Default for InitImageMode {
    fn default() -> Self {
        InitImageMode::ImageStrength {
            image_strength: None,
        }
    }
}

/// Engine selection for v1 upscaling; the two engines take different inputs
#[derive(Debug, Clone)]
pub enum UpscaleEngine {
    /// Fast non-generative 2x upscale
    Esrgan,
    /// Latent diffusion upscaler with optional guidance
    Latent {
        text_prompts: Vec<TextPrompt>,
        seed: Option<u64>,
        steps: Option<u32>,
        cfg_scale: Option<f32>,
    },
}

impl UpscaleEngine {
    fn engine_id(&self) -> &'static str {
        match self {
            UpscaleEngine::Esrgan => "esrgan-v1-x2plus",
            UpscaleEngine::Latent { .. } => "stable-diffusion-x4-latent-upscaler",
        }
    }
}

/// Output dimensions for v1 upscaling; at most one applies per engine
#[derive(Debug, Clone, Default)]
pub struct UpscaleDimensions {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Where the inpainting mask comes from
#[derive(Debug, Clone)]
pub enum MaskSource {
    /// White mask pixels are inpainted; value is a URL or local path
    MaskImageWhite(String),
    /// Black mask pixels are inpainted; value is a URL or local path
    MaskImageBlack(String),
    /// Use the alpha channel of the init image
    InitImageAlpha,
}

impl MaskSource {
    fn as_str(&self) -> &'static str {
        match self {
            MaskSource::MaskImageWhite(_) => "MASK_IMAGE_WHITE",
            MaskSource::MaskImageBlack(_) => "MASK_IMAGE_BLACK",
            MaskSource::InitImageAlpha => "INIT_IMAGE_ALPHA",
        }
    }

    fn mask_image(&self) -> Option<&str> {
        match self {
            MaskSource::MaskImageWhite(image) | MaskSource::MaskImageBlack(image) => Some(image),
            MaskSource::InitImageAlpha => None,
        }
    }
}

impl Stability {
    /// Generate images from weighted text prompts (v1)
    pub async fn text_to_image(
        &self,
        engine_id: &str,
        prompts: &[TextPrompt],
        options: TextToImageOptions,
    ) -> Result<Vec<ContentResult>> {
        let mut body = json!(options);
        body["text_prompts"] = json!(prompts);

        let url = self.make_url(
            ApiVersion::V1,
            RESOURCE,
            &format!("{engine_id}/text-to-image"),
        );
        let (status, response_body) = self.post_json(&url, &body, true).await?;

        process_artifacts(
            status,
            &response_body,
            "v1_generation_text_to_image",
            "Failed to run text to image",
        )
        .await
    }

    /// Generate images conditioned on an init image (v1)
    pub async fn image_to_image(
        &self,
        engine_id: &str,
        prompts: &[TextPrompt],
        init_image: &str,
        mode: InitImageMode,
        options: GenerationOptions,
    ) -> Result<Vec<ContentResult>> {
        let mut init_ref = ImageReference::create(init_image)?;

        let result = async {
            let mut form = Form::new()
                .part("init_image", init_ref.to_part(self.http_client()).await?);
            form = append_text_prompts(form, prompts);

            match &mode {
                InitImageMode::ImageStrength { image_strength } => {
                    form = form.text("mode", "IMAGE_STRENGTH");
                    if let Some(strength) = image_strength {
                        form = form.text("image_strength", strength.to_string());
                    }
                }
                InitImageMode::StepSchedule { start, end } => {
                    form = form.text("mode", "STEP_SCHEDULE");
                    if let Some(start) = start {
                        form = form.text("step_schedule_start", start.to_string());
                    }
                    if let Some(end) = end {
                        form = form.text("step_schedule_end", end.to_string());
                    }
                }
            }
            form = append_generation_options(form, &options);

            let url = self.make_url(
                ApiVersion::V1,
                RESOURCE,
                &format!("{engine_id}/image-to-image"),
            );
            self.post_form(&url, form, true).await
        }
        .await;

        init_ref.cleanup().await;

        let (status, body) = result?;
        process_artifacts(
            status,
            &body,
            "v1_generation_image_to_image",
            "Failed to run image to image",
        )
        .await
    }

    /// Upscale an image with one of the v1 upscaling engines
    pub async fn image_to_image_upscale(
        &self,
        image: &str,
        engine: UpscaleEngine,
        dimensions: UpscaleDimensions,
    ) -> Result<Vec<ContentResult>> {
        let mut image_ref = ImageReference::create(image)?;

        let result = async {
            let mut form = Form::new()
                .part("image", image_ref.to_part(self.http_client()).await?);
            if let Some(width) = dimensions.width {
                form = form.text("width", width.to_string());
            }
            if let Some(height) = dimensions.height {
                form = form.text("height", height.to_string());
            }

            if let UpscaleEngine::Latent {
                text_prompts,
                seed,
                steps,
                cfg_scale,
            } = &engine
            {
                form = append_text_prompts(form, text_prompts);
                if let Some(seed) = seed {
                    form = form.text("seed", seed.to_string());
                }
                if let Some(steps) = steps {
                    form = form.text("steps", steps.to_string());
                }
                if let Some(cfg_scale) = cfg_scale {
                    form = form.text("cfg_scale", cfg_scale.to_string());
                }
            }

            let url = self.make_url(
                ApiVersion::V1,
                RESOURCE,
                &format!("{}/image-to-image/upscale", engine.engine_id()),
            );
            self.post_form(&url, form, true).await
        }
        .await;

        image_ref.cleanup().await;

        let (status, body) = result?;
        process_artifacts(
            status,
            &body,
            "v1_generation_image_to_image_upscale",
            "Failed to run image to image upscale",
        )
        .await
    }

    /// Inpaint an init image constrained by a mask (v1)
    pub async fn image_to_image_masking(
        &self,
        engine_id: &str,
        prompts: &[TextPrompt],
        init_image: &str,
        mask: MaskSource,
        options: GenerationOptions,
    ) -> Result<Vec<ContentResult>> {
        let mut init_ref = ImageReference::create(init_image)?;
        let mut mask_ref = mask
            .mask_image()
            .map(ImageReference::create)
            .transpose()?;

        let result = async {
            let mut form = Form::new()
                .part("init_image", init_ref.to_part(self.http_client()).await?)
                .text("mask_source", mask.as_str());
            form = append_text_prompts(form, prompts);
            if let Some(mask) = mask_ref.as_mut() {
                form = form.part("mask_image", mask.to_part(self.http_client()).await?);
            }
            form = append_generation_options(form, &options);

            let url = self.make_url(
                ApiVersion::V1,
                RESOURCE,
                &format!("{engine_id}/image-to-image/masking"),
            );
            self.post_form(&url, form, true).await
        }
        .await;

        init_ref.cleanup().await;
        if let Some(mask) = mask_ref.as_mut() {
            mask.cleanup().await;
        }

        let (status, body) = result?;
        process_artifacts(
            status,
            &body,
            "v1_generation_image_to_image_masking",
            "Failed to run image to image masking",
        )
        .await
    }
}

/// Decode every artifact in a v1 response into its own result
async fn process_artifacts(
    status: u16,
    body: &Value,
    tag: &str,
    context: &str,
) -> Result<Vec<ContentResult>> {
    let artifacts = match body.get("artifacts").and_then(Value::as_array) {
        Some(artifacts) if status == 200 => artifacts,
        _ => return Err(StabilityError::from_status(status, context, body)),
    };

    let mut results = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        results.push(response::decode_content(artifact, OutputFormat::Png, tag).await?);
    }
    Ok(results)
}

/// Serialize weighted prompts in the bracket notation the form endpoints use
fn append_text_prompts(mut form: Form, prompts: &[TextPrompt]) -> Form {
    for (index, prompt) in prompts.iter().enumerate() {
        form = form
            .text(format!("text_prompts[{index}][text]"), prompt.text.clone())
            .text(
                format!("text_prompts[{index}][weight]"),
                prompt.weight.to_string(),
            );
    }
    form
}

fn append_generation_options(mut form: Form, options: &GenerationOptions) -> Form {
    if let Some(cfg_scale) = options.cfg_scale {
        form = form.text("cfg_scale", cfg_scale.to_string());
    }
    if let Some(preset) = options.clip_guidance_preset {
        form = form.text("clip_guidance_preset", preset.as_str());
    }
    if let Some(sampler) = options.sampler {
        form = form.text("sampler", sampler.as_str());
    }
    if let Some(samples) = options.samples {
        form = form.text("samples", samples.to_string());
    }
    if let Some(seed) = options.seed {
        form = form.text("seed", seed.to_string());
    }
    if let Some(steps) = options.steps {
        form = form.text("steps", steps.to_string());
    }
    if let Some(preset) = options.style_preset {
        form = form.text("style_preset", preset.as_str());
    }
    form
}
