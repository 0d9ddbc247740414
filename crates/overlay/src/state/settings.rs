//! Overlay settings, persisted as JSON in the platform config directory

use std::path::Path;

use egui::Color32;
use serde::{Deserialize, Serialize};
use shared::Rgba;

use crate::engine2d::{ColorSettings, LineCap, PointColors, TextSettings, TextStyle};
use crate::error::Result;
use crate::helpers::to_color32;
use crate::measure::OverlayStyle;
use crate::sdk::DrawSettings;

/// Stroke and fill colours of one category of geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineColors {
    pub line: Rgba,
    pub fill: Option<Rgba>,
    pub outline: Option<Rgba>,
}

impl LineColors {
    fn new(line: Rgba) -> Self {
        Self {
            line,
            fill: None,
            outline: Some([0, 0, 0, 160]),
        }
    }
}

/// Point marker colours
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointSettings {
    pub start: Rgba,
    pub middle: Rgba,
    pub end: Rgba,
    /// Show intermediate points, not only the ends
    pub display_all: bool,
}

impl Default for PointSettings {
    fn default() -> Self {
        Self {
            start: [0, 200, 255, 255],
            middle: [255, 255, 255, 255],
            end: [255, 120, 0, 255],
            display_all: true,
        }
    }
}

/// Cylinder tube rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylinderSettings {
    pub shaded: bool,
    /// Colour of the lower end
    pub low: Rgba,
    /// Colour of the higher end
    pub high: Rgba,
}

impl Default for CylinderSettings {
    fn default() -> Self {
        Self {
            shaded: true,
            low: [220, 50, 50, 255],
            high: [50, 200, 80, 255],
        }
    }
}

/// Label font and number formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    pub font_size: f32,
    pub color: Rgba,
    pub halo: Option<Rgba>,
    pub decimals: usize,
    /// Appended to lengths after a space
    pub unit: String,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            color: [255, 255, 255, 255],
            halo: Some([0, 0, 0, 255]),
            decimals: 3,
            unit: "m".into(),
        }
    }
}

/// All overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub entity: LineColors,
    pub result: LineColors,
    pub hover: LineColors,
    pub area: LineColors,
    pub point_line: LineColors,
    pub points: PointSettings,
    pub cylinder: CylinderSettings,
    pub labels: LabelSettings,
    /// Stroke width in pixels
    pub pixel_width: f32,
    pub line_cap: LineCap,
    /// Downhill arrows on point-lines
    pub slope_arrows: bool,
    /// Distance between segment labels, in world units
    pub segment_label_interval: Option<f32>,
    /// Pick radius in pixels
    pub pick_tolerance: f32,
    /// Snap radius in pixels
    pub snap_tolerance: f32,
    /// Redraw on idle frames while the pointer moves
    pub tracer: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            entity: LineColors::new([255, 200, 50, 255]),
            result: LineColors::new([80, 170, 255, 255]),
            hover: LineColors {
                outline: None,
                ..LineColors::new([255, 255, 255, 255])
            },
            area: LineColors {
                fill: Some([255, 200, 50, 60]),
                ..LineColors::new([255, 200, 50, 255])
            },
            point_line: LineColors::new([255, 200, 50, 255]),
            points: PointSettings::default(),
            cylinder: CylinderSettings::default(),
            labels: LabelSettings::default(),
            pixel_width: 2.0,
            line_cap: LineCap::Round,
            slope_arrows: true,
            segment_label_interval: None,
            pick_tolerance: 8.0,
            snap_tolerance: 10.0,
            tracer: false,
        }
    }
}

impl OverlaySettings {
    /// Load settings from the config directory, or defaults if missing or unreadable
    pub fn load() -> Self {
        if let Some(dirs) = project_dirs() {
            let path = dirs.config_dir().join("overlay.json");
            if let Ok(settings) = Self::load_from(&path) {
                return settings;
            }
        }
        Self::default()
    }

    /// Save settings to the config directory
    pub fn save(&self) {
        if let Some(dirs) = project_dirs() {
            let config_dir = dirs.config_dir();
            if std::fs::create_dir_all(config_dir).is_ok() {
                if let Err(err) = self.save_to(&config_dir.join("overlay.json")) {
                    tracing::warn!("could not save overlay settings: {err}");
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn colors(&self, colors: &LineColors) -> ColorSettings {
        ColorSettings {
            line_color: to_color32(colors.line),
            fill_color: colors.fill.map(to_color32),
            outline_color: colors.outline.map(to_color32),
            point_color: PointColors {
                start: to_color32(self.points.start),
                middle: to_color32(self.points.middle),
                end: to_color32(self.points.end),
            },
            display_all_points: self.points.display_all,
            complex_cylinder: self.cylinder.shaded,
            cylinder_low: to_color32(self.cylinder.low),
            cylinder_high: to_color32(self.cylinder.high),
            slope_arrows: false,
        }
    }

    /// Drawing style for the overlay
    pub fn style(&self) -> OverlayStyle {
        OverlayStyle {
            entity: self.colors(&self.entity),
            result: self.colors(&self.result),
            hover: self.colors(&self.hover),
            area: self.colors(&self.area),
            point_line: ColorSettings {
                slope_arrows: self.slope_arrows,
                ..self.colors(&self.point_line)
            },
            text: TextSettings {
                style: TextStyle {
                    size: self.labels.font_size,
                    color: to_color32(self.labels.color),
                    outline: self.labels.halo.map(to_color32),
                },
            },
            pixel_width: self.pixel_width,
            line_cap: self.line_cap,
        }
    }

    pub fn draw_settings(&self) -> DrawSettings {
        DrawSettings {
            segment_label_interval: self.segment_label_interval,
            label_decimals: self.labels.decimals,
            unit_suffix: self.labels.unit.clone(),
        }
    }

    /// Background colour of marker glyphs
    pub fn marker_color(&self) -> Color32 {
        to_color32(self.entity.line)
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "measure-overlay", "measure-overlay")
}
