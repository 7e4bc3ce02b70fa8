//! Saved window geometry
//!
//! The snapshot is an opaque blob to callers. Internally it is versioned
//! JSON; settings files embed the same envelope as a nested object.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::geometry::Rect;
use crate::state::ShowState;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometrySnapshot {
    /// Frame the window restores to, in physical pixels
    pub normal_geometry: Rect,
    pub show_state: ShowState,
    /// Pixel ratio at save time
    pub pixel_ratio: f64,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    #[serde(flatten)]
    snapshot: GeometrySnapshot,
}

impl GeometrySnapshot {
    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        let envelope = Envelope {
            version: FORMAT_VERSION,
            snapshot: *self,
        };
        serde_json::to_vec(&envelope).context("Failed to serialize geometry snapshot")
    }

    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let envelope: Envelope =
            serde_json::from_slice(bytes).context("Malformed geometry snapshot")?;
        envelope.into_snapshot()
    }

    /// Envelope as a JSON value, for embedding in settings files
    pub fn to_json(&self) -> anyhow::Result<Value> {
        let envelope = Envelope {
            version: FORMAT_VERSION,
            snapshot: *self,
        };
        serde_json::to_value(&envelope).context("Failed to serialize geometry snapshot")
    }

    pub fn from_json(value: &Value) -> anyhow::Result<Self> {
        let envelope = Envelope::deserialize(value).context("Malformed geometry snapshot")?;
        envelope.into_snapshot()
    }

    /// Normal geometry rescaled to another pixel ratio. The top-left corner
    /// stays where it was saved.
    pub fn geometry_for_ratio(&self, pixel_ratio: f64) -> Rect {
        let saved = self.pixel_ratio;
        if !(saved.is_finite() && saved > 0.0) || !(pixel_ratio.is_finite() && pixel_ratio > 0.0) {
            return self.normal_geometry;
        }
        let factor = pixel_ratio / saved;
        let rect = self.normal_geometry;
        rect.with_size(
            (rect.width as f64 * factor).round() as i32,
            (rect.height as f64 * factor).round() as i32,
        )
    }
}

impl Envelope {
    fn into_snapshot(self) -> anyhow::Result<GeometrySnapshot> {
        if self.version != FORMAT_VERSION {
            anyhow::bail!(
                "Unsupported geometry snapshot version {} (expected {})",
                self.version,
                FORMAT_VERSION
            );
        }
        Ok(self.snapshot)
    }
}
