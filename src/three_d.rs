//! 3D generation endpoints (v2beta `3d`)

use reqwest::multipart::Form;
use serde_json::Value;

use crate::client::Stability;
use crate::error::{Result, StabilityError};
use crate::image_ref::ImageReference;
use crate::response;
use crate::types::{ApiVersion, ContentResult, OutputFormat};

const RESOURCE: &str = "3d";

/// Options for the Stable Fast 3D endpoint
#[derive(Debug, Clone, Default)]
pub struct Fast3dOptions {
    pub texture_resolution: Option<u32>,
    pub foreground_ratio: Option<f32>,
}

impl Fast3dOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texture_resolution(mut self, resolution: u32) -> Self {
        self.texture_resolution = Some(resolution);
        self
    }

    pub fn with_foreground_ratio(mut self, ratio: f32) -> Self {
        self.foreground_ratio = Some(ratio);
        self
    }
}

impl Stability {
    /// Generate a 3D mesh from an image.
    ///
    /// Unlike the other families, the success body here is the raw glTF
    /// binary rather than base64-in-JSON; the bytes are written straight to
    /// scratch storage as a `.glb` file. These endpoints expose no
    /// moderation state.
    pub async fn stable_fast_3d(
        &self,
        image: &str,
        options: Fast3dOptions,
    ) -> Result<ContentResult> {
        let mut image_ref = ImageReference::create(image)?;

        let result = async {
            let mut form = Form::new()
                .part("image", image_ref.to_part(self.http_client()).await?);
            if let Some(resolution) = options.texture_resolution {
                form = form.text("texture_resolution", resolution.to_string());
            }
            if let Some(ratio) = options.foreground_ratio {
                form = form.text("foreground_ratio", ratio.to_string());
            }

            let url = self.make_url(ApiVersion::V2Beta, RESOURCE, "stable-fast-3d");
            self.post_form_binary(&url, form).await
        }
        .await;

        image_ref.cleanup().await;

        let (status, bytes) = result?;
        if status == 200 {
            return response::decode_binary(&bytes, OutputFormat::Glb, "v2beta_3d_stable_fast_3d")
                .await;
        }

        // error bodies on the binary endpoint are still JSON
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        Err(StabilityError::from_status(
            status,
            "Failed to run stable fast 3d",
            &body,
        ))
    }
}
