use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("failed to parse scene: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid scene: {0}")]
    Invalid(String),
}

/// What a section presents inside the stage. Opaque to the gesture engine;
/// the host decides what to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => f.write_str("video"),
            MediaKind::Image => f.write_str("image"),
        }
    }
}

/// A scene description: gesture tuning, stage extents, and one panel section
/// per piece of content. Parsed from TOML and validated before use.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scene {
    pub version: u32,
    #[serde(default)]
    pub gesture: GestureTuning,
    #[serde(default)]
    pub media: MediaExtents,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Thresholds and gains for the scroll-expansion gesture. Every field has a
/// default matching the shipped feel; scenes override only what they need.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct GestureTuning {
    /// Progress gained per wheel pixel.
    #[serde(default = "default_wheel_gain")]
    pub wheel_gain: f32,
    /// Progress gained per touch-drag pixel while the drag advances progress.
    #[serde(default = "default_touch_gain_advance")]
    pub touch_gain_advance: f32,
    /// Progress lost per touch-drag pixel while the drag retreats progress.
    #[serde(default = "default_touch_gain_retreat")]
    pub touch_gain_retreat: f32,
    /// Progress below which revealed content hides again.
    #[serde(default = "default_reveal_floor")]
    pub reveal_floor: f32,
    /// Page offset tolerance (px) under which a collapse gesture is honoured.
    #[serde(default = "default_release_slack")]
    pub release_slack: f32,
    /// Cumulative downward drag (px) required to collapse by touch.
    #[serde(default = "default_touch_release_drag")]
    pub touch_release_drag: f32,
    /// Viewport width (px) below which mobile geometry applies.
    #[serde(default = "default_mobile_breakpoint")]
    pub mobile_breakpoint: f32,
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self {
            wheel_gain: default_wheel_gain(),
            touch_gain_advance: default_touch_gain_advance(),
            touch_gain_retreat: default_touch_gain_retreat(),
            reveal_floor: default_reveal_floor(),
            release_slack: default_release_slack(),
            touch_release_drag: default_touch_release_drag(),
            mobile_breakpoint: default_mobile_breakpoint(),
        }
    }
}

/// Stage geometry: the collapsed media size plus how far it grows at full
/// expansion, per breakpoint, and how far the flanking text slides out.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaExtents {
    #[serde(default = "default_base_width")]
    pub base_width: f32,
    #[serde(default = "default_base_height")]
    pub base_height: f32,
    #[serde(default = "default_width_growth_desktop")]
    pub width_growth_desktop: f32,
    #[serde(default = "default_width_growth_mobile")]
    pub width_growth_mobile: f32,
    #[serde(default = "default_height_growth_desktop")]
    pub height_growth_desktop: f32,
    #[serde(default = "default_height_growth_mobile")]
    pub height_growth_mobile: f32,
    #[serde(default = "default_text_offset_desktop")]
    pub text_offset_desktop: f32,
    #[serde(default = "default_text_offset_mobile")]
    pub text_offset_mobile: f32,
    /// How long the revealed content takes to fade in.
    #[serde(
        default = "default_reveal_fade",
        deserialize_with = "deserialize_duration"
    )]
    pub reveal_fade: Duration,
}

impl Default for MediaExtents {
    fn default() -> Self {
        Self {
            base_width: default_base_width(),
            base_height: default_base_height(),
            width_growth_desktop: default_width_growth_desktop(),
            width_growth_mobile: default_width_growth_mobile(),
            height_growth_desktop: default_height_growth_desktop(),
            height_growth_mobile: default_height_growth_mobile(),
            text_offset_desktop: default_text_offset_desktop(),
            text_offset_mobile: default_text_offset_mobile(),
            reveal_fade: default_reveal_fade(),
        }
    }
}

/// One panel of the scene: an identity, the media it reveals, and the
/// lightning parameters drawn behind it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Section {
    pub id: String,
    pub media: MediaKind,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub lightning: ShaderParams,
}

/// Per-section lightning shader parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ShaderParams {
    /// Base hue in degrees, [0, 360).
    #[serde(default = "default_hue")]
    pub hue: f32,
    /// Horizontal shift of the bolt in normalized units.
    #[serde(default)]
    pub x_offset: f32,
    /// Time multiplier for the noise flow.
    #[serde(default = "default_unit")]
    pub speed: f32,
    /// Brightness multiplier.
    #[serde(default = "default_unit")]
    pub intensity: f32,
    /// Noise frequency multiplier.
    #[serde(default = "default_unit")]
    pub size: f32,
}

impl Default for ShaderParams {
    fn default() -> Self {
        Self {
            hue: default_hue(),
            x_offset: 0.0,
            speed: default_unit(),
            intensity: default_unit(),
            size: default_unit(),
        }
    }
}

fn default_wheel_gain() -> f32 {
    0.0009
}

fn default_touch_gain_advance() -> f32 {
    0.005
}

fn default_touch_gain_retreat() -> f32 {
    0.008
}

fn default_reveal_floor() -> f32 {
    0.75
}

fn default_release_slack() -> f32 {
    5.0
}

fn default_touch_release_drag() -> f32 {
    20.0
}

fn default_mobile_breakpoint() -> f32 {
    768.0
}

fn default_base_width() -> f32 {
    300.0
}

fn default_base_height() -> f32 {
    400.0
}

fn default_width_growth_desktop() -> f32 {
    1250.0
}

fn default_width_growth_mobile() -> f32 {
    650.0
}

fn default_height_growth_desktop() -> f32 {
    400.0
}

fn default_height_growth_mobile() -> f32 {
    200.0
}

fn default_text_offset_desktop() -> f32 {
    150.0
}

fn default_text_offset_mobile() -> f32 {
    180.0
}

fn default_reveal_fade() -> Duration {
    Duration::from_millis(700)
}

fn default_hue() -> f32 {
    230.0
}

fn default_unit() -> f32 {
    1.0
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl Scene {
    pub fn from_toml_str(input: &str) -> Result<Self, SceneError> {
        let raw: Scene = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// The scene used when no scene file is supplied: a single video panel
    /// with the stock lightning look.
    pub fn builtin() -> Self {
        Self {
            version: 1,
            gesture: GestureTuning::default(),
            media: MediaExtents::default(),
            sections: vec![Section {
                id: "storm".into(),
                media: MediaKind::Video,
                source: None,
                title: Some("Storm".into()),
                lightning: ShaderParams::default(),
            }],
        }
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        if self.version != 1 {
            return Err(SceneError::Invalid(format!(
                "unsupported scene version {}; expected 1",
                self.version
            )));
        }

        if self.sections.is_empty() {
            return Err(SceneError::Invalid(
                "scene must define at least one section".into(),
            ));
        }

        let mut seen_ids = BTreeSet::new();
        for section in &self.sections {
            if section.id.trim().is_empty() {
                return Err(SceneError::Invalid(
                    "section id may not be empty".into(),
                ));
            }

            if !seen_ids.insert(section.id.as_str()) {
                return Err(SceneError::Invalid(format!(
                    "duplicate section id '{}'",
                    section.id
                )));
            }

            section.lightning.validate(&section.id)?;
        }

        self.gesture.validate()?;
        self.media.validate()?;

        Ok(())
    }
}

impl ShaderParams {
    fn validate(&self, section_id: &str) -> Result<(), SceneError> {
        if !self.hue.is_finite() || self.hue < 0.0 || self.hue >= 360.0 {
            return Err(SceneError::Invalid(format!(
                "section '{section_id}' hue must be in [0, 360); got {}",
                self.hue
            )));
        }

        if !self.x_offset.is_finite() {
            return Err(SceneError::Invalid(format!(
                "section '{section_id}' x_offset must be finite"
            )));
        }

        for (name, value) in [
            ("speed", self.speed),
            ("intensity", self.intensity),
            ("size", self.size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SceneError::Invalid(format!(
                    "section '{section_id}' {name} must be > 0; got {value}"
                )));
            }
        }

        Ok(())
    }
}

impl GestureTuning {
    fn validate(&self) -> Result<(), SceneError> {
        for (name, value) in [
            ("gesture.wheel_gain", self.wheel_gain),
            ("gesture.touch_gain_advance", self.touch_gain_advance),
            ("gesture.touch_gain_retreat", self.touch_gain_retreat),
            ("gesture.mobile_breakpoint", self.mobile_breakpoint),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SceneError::Invalid(format!(
                    "{name} must be > 0; got {value}"
                )));
            }
        }

        if !self.reveal_floor.is_finite()
            || self.reveal_floor <= 0.0
            || self.reveal_floor > 1.0
        {
            return Err(SceneError::Invalid(format!(
                "gesture.reveal_floor must be in (0, 1]; got {}",
                self.reveal_floor
            )));
        }

        for (name, value) in [
            ("gesture.release_slack", self.release_slack),
            ("gesture.touch_release_drag", self.touch_release_drag),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SceneError::Invalid(format!(
                    "{name} must be >= 0; got {value}"
                )));
            }
        }

        Ok(())
    }
}

impl MediaExtents {
    fn validate(&self) -> Result<(), SceneError> {
        for (name, value) in [
            ("media.base_width", self.base_width),
            ("media.base_height", self.base_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SceneError::Invalid(format!(
                    "{name} must be > 0; got {value}"
                )));
            }
        }

        for (name, value) in [
            ("media.width_growth_desktop", self.width_growth_desktop),
            ("media.width_growth_mobile", self.width_growth_mobile),
            ("media.height_growth_desktop", self.height_growth_desktop),
            ("media.height_growth_mobile", self.height_growth_mobile),
            ("media.text_offset_desktop", self.text_offset_desktop),
            ("media.text_offset_mobile", self.text_offset_mobile),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SceneError::Invalid(format!(
                    "{name} must be >= 0; got {value}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[gesture]
wheel_gain = 0.0012
release_slack = 8.0

[media]
base_width = 320.0
reveal_fade = "500ms"

[[sections]]
id = "storm"
media = "video"
source = "media/storm-loop.mp4"
title = "Beyond the Static"

[sections.lightning]
hue = 340.0
speed = 1.6
intensity = 0.6
size = 2.0

[[sections]]
id = "stills"
media = "image"

[sections.lightning]
hue = 230.0
"#;

    #[test]
    fn parses_sample_scene() {
        let scene = Scene::from_toml_str(SAMPLE).expect("parse scene");
        assert_eq!(scene.version, 1);
        assert_eq!(scene.sections.len(), 2);
        assert_eq!(scene.gesture.wheel_gain, 0.0012);
        assert_eq!(scene.gesture.release_slack, 8.0);
        assert_eq!(scene.media.base_width, 320.0);
        assert_eq!(scene.media.reveal_fade, Duration::from_millis(500));

        let storm = scene.section("storm").expect("storm section");
        assert_eq!(storm.media, MediaKind::Video);
        assert_eq!(storm.lightning.hue, 340.0);
        assert_eq!(storm.lightning.speed, 1.6);
        assert_eq!(storm.source.as_deref(), Some("media/storm-loop.mp4"));
    }

    #[test]
    fn applies_defaults_to_sparse_sections() {
        let scene = Scene::from_toml_str(
            r#"
version = 1

[[sections]]
id = "only"
media = "image"
"#,
        )
        .expect("parse scene");

        let section = scene.section("only").expect("section");
        assert_eq!(section.lightning.hue, 230.0);
        assert_eq!(section.lightning.x_offset, 0.0);
        assert_eq!(section.lightning.speed, 1.0);
        assert_eq!(scene.gesture.wheel_gain, 0.0009);
        assert_eq!(scene.gesture.touch_gain_advance, 0.005);
        assert_eq!(scene.gesture.touch_gain_retreat, 0.008);
        assert_eq!(scene.gesture.reveal_floor, 0.75);
        assert_eq!(scene.media.base_width, 300.0);
        assert_eq!(scene.media.reveal_fade, Duration::from_millis(700));
    }

    #[test]
    fn builtin_scene_validates() {
        let scene = Scene::builtin();
        scene.validate().expect("builtin scene must be valid");
        assert_eq!(scene.sections.len(), 1);
    }

    #[test]
    fn numeric_reveal_fade_is_seconds() {
        let scene = Scene::from_toml_str(
            r#"
version = 1

[media]
reveal_fade = 1

[[sections]]
id = "only"
media = "video"
"#,
        )
        .expect("parse scene");
        assert_eq!(scene.media.reveal_fade, Duration::from_secs(1));
    }

    #[test]
    fn rejects_wrong_version() {
        let err = Scene::from_toml_str(
            r#"
version = 2

[[sections]]
id = "only"
media = "video"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::Invalid(_)));
    }

    #[test]
    fn rejects_empty_sections() {
        let err = Scene::from_toml_str("version = 1").unwrap_err();
        assert!(matches!(err, SceneError::Invalid(_)));
    }

    #[test]
    fn rejects_duplicate_section_ids() {
        let err = Scene::from_toml_str(
            r#"
version = 1

[[sections]]
id = "twin"
media = "video"

[[sections]]
id = "twin"
media = "image"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::Invalid(_)));
    }

    #[test]
    fn rejects_out_of_range_hue() {
        let err = Scene::from_toml_str(
            r#"
version = 1

[[sections]]
id = "only"
media = "video"

[sections.lightning]
hue = 360.0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::Invalid(_)));
    }

    #[test]
    fn rejects_non_positive_speed() {
        let err = Scene::from_toml_str(
            r#"
version = 1

[[sections]]
id = "only"
media = "video"

[sections.lightning]
speed = 0.0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::Invalid(_)));
    }

    #[test]
    fn rejects_reveal_floor_above_one() {
        let err = Scene::from_toml_str(
            r#"
version = 1

[gesture]
reveal_floor = 1.5

[[sections]]
id = "only"
media = "video"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::Invalid(_)));
    }
}
