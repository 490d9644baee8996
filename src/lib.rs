//! # Stability AI SDK
//!
//! Rust SDK for the Stability AI REST API: image generation and editing,
//! upscaling, image-to-video, and image-to-3D.
//!
//! ## Quick Start
//!
//! ```no_run
//! use stability_ai::{Stability, GenerateOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Stability::new("sk-xxx")?;
//!
//!     let result = client
//!         .generate_core("A watercolor painting of a harbor at sunset", GenerateOptions::new())
//!         .await?;
//!
//!     println!("Image written to {}", result.filepath.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Image inputs
//!
//! Every operation that takes an image accepts either a public `http(s)`
//! URL or a local file path. Remote images are downloaded into scratch
//! storage for the duration of the call and removed afterwards; local
//! files are used in place and never deleted.
//!
//! ## Asynchronous jobs
//!
//! Video generation, creative upscaling and background relighting are
//! asynchronous: submission returns a job id, and a paired result method
//! must be polled until the job reaches a terminal state. The SDK never
//! sleeps or retries internally; a delay of around 2.5 seconds between
//! polls works well in practice.
//!
//! ```no_run
//! use stability_ai::{AsyncResult, Stability, VideoOptions};
//! use std::time::Duration;
//!
//! # async fn example() -> stability_ai::Result<()> {
//! let client = Stability::new("sk-xxx")?;
//! let job = client.image_to_video("./frame.png", VideoOptions::new()).await?;
//!
//! let video = loop {
//!     match client.image_to_video_result(&job.id).await? {
//!         AsyncResult::Content(content) => break content,
//!         AsyncResult::InProgress(_) => {
//!             tokio::time::sleep(Duration::from_millis(2500)).await;
//!         }
//!     }
//! };
//! println!("Video written to {}", video.filepath.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! ```no_run
//! use stability_ai::{Stability, GenerateOptions, StabilityError};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Stability::new("sk-xxx")?;
//!
//! match client.generate_ultra("test", GenerateOptions::new()).await {
//!     Ok(result) => println!("Image: {}", result.filepath.display()),
//!     Err(StabilityError::Unauthorized { message, .. }) => {
//!         eprintln!("Invalid API key: {message}");
//!     }
//!     Err(StabilityError::ContentModeration { message, .. }) => {
//!         eprintln!("Request rejected by moderation: {message}");
//!     }
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod control;
mod edit;
mod error;
mod generate;
mod image_ref;
mod response;
mod results;
mod three_d;
mod types;
mod upscale;
mod v1;
mod video;

// Re-export main types
pub use client::Stability;
pub use error::{Result, StabilityError};
pub use image_ref::{ImageReference, Origin};
pub use types::{
    // Configuration
    StabilityConfig,
    // Results
    AspectRatio,
    AsyncResult,
    ContentResult,
    ContentType,
    CreativeUpscaleHandle,
    Engine,
    EngineType,
    JobHandle,
    JobStatus,
    OutputFormat,
};

// Endpoint parameters
pub use control::ControlOptions;
pub use edit::{
    EraseOptions, InpaintOptions, LightDirection, OutpaintOptions, RelightOptions,
    SearchAndReplaceOptions,
};
pub use generate::{GenerateOptions, Sd3Mode, Sd3Model, Sd3Options};
pub use three_d::Fast3dOptions;
pub use upscale::UpscaleOptions;
pub use v1::{
    ClipGuidancePreset, GenerationOptions, InitImageMode, MaskSource, Sampler, StylePreset,
    TextPrompt, TextToImageOptions, UpscaleDimensions, UpscaleEngine,
};
pub use video::VideoOptions;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = StabilityConfig::new("test_key")
            .with_base_url("https://custom.url")
            .with_timeout(30)
            .with_organization("org-123")
            .with_client_id("my-app")
            .with_client_version("1.2.3");

        assert_eq!(config.api_key, "test_key");
        assert_eq!(config.base_url, Some("https://custom.url".to_string()));
        assert_eq!(config.timeout, Some(30));
        assert_eq!(config.organization, Some("org-123".to_string()));
        assert_eq!(config.client_id, Some("my-app".to_string()));
        assert_eq!(config.client_version, Some("1.2.3".to_string()));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(matches!(
            Stability::new(""),
            Err(StabilityError::EmptyApiKey)
        ));
    }

    #[test]
    fn test_generate_options_builder() {
        let options = GenerateOptions::new()
            .with_aspect_ratio(AspectRatio::Ratio16x9)
            .with_negative_prompt("blurry")
            .with_seed(7)
            .with_output_format(OutputFormat::Webp);

        assert_eq!(options.aspect_ratio, Some(AspectRatio::Ratio16x9));
        assert_eq!(options.negative_prompt, Some("blurry".to_string()));
        assert_eq!(options.seed, Some(7));
        assert_eq!(options.output_format, Some(OutputFormat::Webp));
    }

    #[test]
    fn test_video_options_defaults() {
        let options = VideoOptions::new();
        assert_eq!(options.cfg_scale, 1.8);
        assert_eq!(options.motion_bucket_id, 127);
        assert_eq!(options.seed, None);
    }

    #[test]
    fn test_output_format_content_type() {
        assert_eq!(OutputFormat::Png.content_type(), ContentType::Image);
        assert_eq!(OutputFormat::Jpeg.content_type(), ContentType::Image);
        assert_eq!(OutputFormat::Webp.content_type(), ContentType::Image);
        assert_eq!(OutputFormat::Mp4.content_type(), ContentType::Video);
        assert_eq!(OutputFormat::Glb.content_type(), ContentType::ThreeD);
        assert_eq!(OutputFormat::default(), OutputFormat::Png);
    }

    #[test]
    fn test_aspect_ratio_wire_values() {
        assert_eq!(AspectRatio::Ratio16x9.as_str(), "16:9");
        assert_eq!(AspectRatio::Ratio9x21.as_str(), "9:21");
    }

    #[test]
    fn test_sampler_wire_values() {
        assert_eq!(Sampler::KDpmpp2sAncestral.as_str(), "K_DPMPP_2S_ANCESTRAL");
        assert_eq!(StylePreset::ThreeDModel.as_str(), "3d-model");
        assert_eq!(ClipGuidancePreset::FastBlue.as_str(), "FAST_BLUE");
    }

    #[test]
    fn test_async_result_helpers() {
        let in_progress = AsyncResult::InProgress(JobStatus {
            id: "abc".to_string(),
            status: "in-progress".to_string(),
        });
        assert!(in_progress.is_in_progress());
        assert!(in_progress.into_content().is_none());
    }
}
