//! Stable Video endpoints (v2beta `image-to-video`)

use reqwest::multipart::Form;

use crate::client::Stability;
use crate::error::Result;
use crate::image_ref::ImageReference;
use crate::response;
use crate::types::{ApiVersion, AsyncResult, JobHandle, OutputFormat};

const RESOURCE: &str = "image-to-video";

const DEFAULT_CFG_SCALE: f32 = 1.8;
const DEFAULT_MOTION_BUCKET_ID: u32 = 127;

/// Options for starting an image-to-video job
#[derive(Debug, Clone)]
pub struct VideoOptions {
    /// How strongly the video sticks to the input image (default 1.8)
    pub cfg_scale: f32,
    /// Amount of motion in the output (default 127)
    pub motion_bucket_id: u32,
    pub seed: Option<u64>,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            cfg_scale: DEFAULT_CFG_SCALE,
            motion_bucket_id: DEFAULT_MOTION_BUCKET_ID,
            seed: None,
        }
    }
}

impl VideoOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cfg_scale(mut self, cfg_scale: f32) -> Self {
        self.cfg_scale = cfg_scale;
        self
    }

    pub fn with_motion_bucket_id(mut self, motion_bucket_id: u32) -> Self {
        self.motion_bucket_id = motion_bucket_id;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Stability {
    /// Submit an image-to-video generation job
    ///
    /// `image` may be a public URL or a local file path. The 200 response
    /// only acknowledges the submission; poll
    /// [`image_to_video_result`](Stability::image_to_video_result) until the
    /// job reaches a terminal state.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use stability_ai::{AsyncResult, Stability, VideoOptions};
    /// use std::time::Duration;
    ///
    /// # async fn example() -> stability_ai::Result<()> {
    /// let client = Stability::new("sk-xxx")?;
    /// let job = client
    ///     .image_to_video("./frame.png", VideoOptions::new())
    ///     .await?;
    ///
    /// let video = loop {
    ///     match client.image_to_video_result(&job.id).await? {
    ///         AsyncResult::Content(content) => break content,
    ///         AsyncResult::InProgress(_) => {
    ///             tokio::time::sleep(Duration::from_millis(2500)).await;
    ///         }
    ///     }
    /// };
    /// println!("{}", video.filepath.display());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn image_to_video(&self, image: &str, options: VideoOptions) -> Result<JobHandle> {
        let mut image_ref = ImageReference::create(image)?;

        let result = async {
            let mut form = Form::new()
                .part("image", image_ref.to_part(self.http_client()).await?)
                .text("cfg_scale", options.cfg_scale.to_string())
                .text("motion_bucket_id", options.motion_bucket_id.to_string());
            if let Some(seed) = options.seed {
                form = form.text("seed", seed.to_string());
            }

            let url = self.make_url(ApiVersion::V2Beta, RESOURCE, "");
            self.post_form(&url, form, false).await
        }
        .await;

        image_ref.cleanup().await;

        let (status, body) = result?;
        let id = response::expect_job_id(
            status,
            &body,
            "Failed to start stable video image to video",
        )?;
        Ok(JobHandle { id })
    }

    /// Poll an image-to-video job for its terminal result.
    ///
    /// Video results always decode as mp4.
    pub async fn image_to_video_result(&self, id: &str) -> Result<AsyncResult> {
        let url = format!(
            "{}/{}",
            self.make_url(ApiVersion::V2Beta, RESOURCE, "result"),
            id
        );
        let (status, body) = self.get_json(&url, false).await?;

        response::interpret_poll(
            status,
            &body,
            OutputFormat::Mp4,
            "v2beta_image_to_video",
            "Failed to fetch stable video image to video result",
        )
        .await
    }
}
