use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use brushlink::chart::SeriesRole;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_to_color32(hue, 0.75, 0.55)
        })
        .collect()
}

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Series colours: overlay role → Color32
// ---------------------------------------------------------------------------

/// Colours for points, the brush rectangle and each overlay role.
#[derive(Debug, Clone)]
pub struct SeriesColors {
    role: [Color32; 3],
    pub point: Color32,
    pub highlighted_point: Color32,
    pub brush_fill: Color32,
}

impl Default for SeriesColors {
    fn default() -> Self {
        let palette = generate_palette(3);
        let selected = palette[0];
        SeriesColors {
            role: [Color32::LIGHT_GRAY, selected, palette[2]],
            point: Color32::from_gray(120),
            highlighted_point: selected,
            brush_fill: Color32::from_rgba_unmultiplied(selected.r(), selected.g(), selected.b(), 40),
        }
    }
}

impl SeriesColors {
    /// Look up the colour for an overlay role.
    pub fn for_role(&self, role: SeriesRole) -> Color32 {
        match role {
            SeriesRole::All => self.role[0],
            SeriesRole::Selected => self.role[1],
            SeriesRole::Unselected => self.role[2],
        }
    }

    /// Legend entries (role label → colour) for the side panel.
    pub fn legend_entries(&self) -> Vec<(&'static str, Color32)> {
        vec![
            ("All rows", self.role[0]),
            ("Selected", self.role[1]),
            ("Unselected", self.role[2]),
        ]
    }
}
