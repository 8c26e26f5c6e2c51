//! Compression parameter planning.
//!
//! Maps (original size, target tier) to a fixed encoder parameter set. The
//! bitrate scales linearly with the compression ratio; this is a single-shot
//! estimate and the output is not verified against the target size.

use serde::{Deserialize, Serialize};

/// One of the two discrete output sizes a user may pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetTier {
    /// 8 MB, aggressive compression.
    Small,
    /// 50 MB, better quality.
    Large,
}

impl TargetTier {
    pub fn size_mb(self) -> u64 {
        match self {
            Self::Small => 8,
            Self::Large => 50,
        }
    }

    pub fn target_bytes(self) -> u64 {
        self.size_mb() * 1024 * 1024
    }

    /// Label used in output file names ("8MB" / "50MB").
    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "8MB",
            Self::Large => "50MB",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeParameters {
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
    pub crf: u32,
    /// Output height cap; width follows to preserve aspect ratio.
    pub scale_height: u32,
}

impl EncodeParameters {
    /// Scale filter expression: cap the height, auto-compute an even width.
    pub fn scale_filter(&self) -> String {
        format!("scale=-2:'min({},ih)'", self.scale_height)
    }
}

/// Pure and total: always yields a parameter set, with a per-tier bitrate
/// floor (100 kbps small, 500 kbps large).
pub fn plan(original_bytes: u64, tier: TargetTier) -> EncodeParameters {
    let ratio = tier.target_bytes() as f64 / original_bytes.max(1) as f64;
    match tier {
        TargetTier::Small => EncodeParameters {
            video_bitrate_kbps: ((ratio * 1000.0).floor() as u32).max(100),
            audio_bitrate_kbps: 64,
            crf: 32,
            scale_height: 720,
        },
        TargetTier::Large => EncodeParameters {
            video_bitrate_kbps: ((ratio * 2000.0).floor() as u32).max(500),
            audio_bitrate_kbps: 128,
            crf: 28,
            scale_height: 1080,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hundred_mb_source_small_tier_hits_the_floor() {
        // 100 MB -> 8 MB: ratio ~0.08, floor(0.08 * 1000) = 80, floored to 100.
        let params = plan(104_857_600, TargetTier::Small);
        assert_eq!(params.video_bitrate_kbps, 100);
        assert_eq!(params.audio_bitrate_kbps, 64);
        assert_eq!(params.crf, 32);
        assert_eq!(params.scale_height, 720);
    }

    #[test]
    fn large_tier_uses_its_own_fixed_settings() {
        let params = plan(104_857_600, TargetTier::Large);
        assert_eq!(params.video_bitrate_kbps, 1000);
        assert_eq!(params.audio_bitrate_kbps, 128);
        assert_eq!(params.crf, 28);
        assert_eq!(params.scale_height, 1080);
    }

    #[test]
    fn bitrate_never_below_tier_floor() {
        for original in [tier_bytes(8), 500 * 1024 * 1024, u64::MAX] {
            assert!(plan(original, TargetTier::Small).video_bitrate_kbps >= 100);
            assert!(plan(original, TargetTier::Large).video_bitrate_kbps >= 500);
        }
    }

    #[test]
    fn small_source_scales_bitrate_up() {
        // 4 MB -> 8 MB target: ratio 2.0.
        let params = plan(4 * 1024 * 1024, TargetTier::Small);
        assert_eq!(params.video_bitrate_kbps, 2000);
    }

    #[test]
    fn plan_is_pure() {
        assert_eq!(
            plan(104_857_600, TargetTier::Small),
            plan(104_857_600, TargetTier::Small)
        );
    }

    #[test]
    fn zero_original_size_still_yields_parameters() {
        let params = plan(0, TargetTier::Small);
        assert!(params.video_bitrate_kbps >= 100);
    }

    #[test]
    fn scale_filter_caps_height_without_upscaling() {
        assert_eq!(
            plan(1, TargetTier::Small).scale_filter(),
            "scale=-2:'min(720,ih)'"
        );
        assert_eq!(
            plan(1, TargetTier::Large).scale_filter(),
            "scale=-2:'min(1080,ih)'"
        );
    }

    #[test]
    fn tier_labels_and_sizes() {
        assert_eq!(TargetTier::Small.label(), "8MB");
        assert_eq!(TargetTier::Large.label(), "50MB");
        assert_eq!(TargetTier::Small.target_bytes(), 8 * 1024 * 1024);
        assert_eq!(TargetTier::Large.target_bytes(), 50 * 1024 * 1024);
    }

    fn tier_bytes(mb: u64) -> u64 {
        mb * 1024 * 1024
    }
}
