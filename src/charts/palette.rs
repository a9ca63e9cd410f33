//! Colours shared by the PNG renderer and the desktop charts.

use crate::data::MedalType;
use serde::Serialize;

/// Backend-neutral RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Colour(pub u8, pub u8, pub u8);

impl Colour {
    /// `#RRGGBB`
    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    /// Blend towards white; `amount` 0 keeps the colour, 1 gives white.
    pub fn lighten(self, amount: f64) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let mix = |c: u8| (c as f64 + (255.0 - c as f64) * amount).round() as u8;
        Self(mix(self.0), mix(self.1), mix(self.2))
    }

    /// Perceived brightness in 0..=1, for picking label colours.
    pub fn luminance(self) -> f64 {
        (0.299 * self.0 as f64 + 0.587 * self.1 as f64 + 0.114 * self.2 as f64) / 255.0
    }

    /// Black or white, whichever reads better on this colour.
    pub fn text_on(self) -> Self {
        if self.luminance() > 0.55 {
            BLACK
        } else {
            WHITE
        }
    }
}

impl From<Colour> for plotters::style::RGBColor {
    fn from(c: Colour) -> Self {
        plotters::style::RGBColor(c.0, c.1, c.2)
    }
}

impl From<Colour> for egui::Color32 {
    fn from(c: Colour) -> Self {
        egui::Color32::from_rgb(c.0, c.1, c.2)
    }
}

pub const WHITE: Colour = Colour(255, 255, 255);
pub const BLACK: Colour = Colour(0, 0, 0);
pub const GRID: Colour = Colour(200, 200, 200);

pub const GOLD: Colour = Colour(255, 215, 0);
pub const SILVER: Colour = Colour(192, 192, 192);
pub const BRONZE: Colour = Colour(205, 127, 50);

pub const MALE: Colour = Colour(74, 144, 226);
pub const FEMALE: Colour = Colour(226, 74, 144);

/// Venue markers.
pub const MARKER: Colour = Colour(255, 75, 75);

pub const PALETTE: [Colour; 10] = [
    Colour(52, 152, 219),
    Colour(231, 76, 60),
    Colour(46, 204, 113),
    Colour(155, 89, 182),
    Colour(243, 156, 18),
    Colour(26, 188, 156),
    Colour(233, 30, 99),
    Colour(0, 188, 212),
    Colour(255, 87, 34),
    Colour(96, 125, 139),
];

pub fn medal_colour(medal: MedalType) -> Colour {
    match medal {
        MedalType::Gold => GOLD,
        MedalType::Silver => SILVER,
        MedalType::Bronze => BRONZE,
    }
}

/// Colour for a gender label, `Male`/`M` and `Female`/`F`.
pub fn gender_colour(gender: &str) -> Colour {
    match gender {
        "Male" | "M" => MALE,
        "Female" | "F" => FEMALE,
        _ => PALETTE[9],
    }
}

/// Categorical colour by index, cycling.
pub fn categorical(index: usize) -> Colour {
    PALETTE[index % PALETTE.len()]
}

// Viridis sampled at nine evenly spaced stops.
const VIRIDIS: [Colour; 9] = [
    Colour(68, 1, 84),
    Colour(71, 44, 122),
    Colour(59, 81, 139),
    Colour(44, 113, 142),
    Colour(33, 144, 141),
    Colour(39, 173, 129),
    Colour(92, 200, 99),
    Colour(170, 220, 50),
    Colour(253, 231, 37),
];

/// Viridis colour for `t` in 0..=1, linearly interpolated between stops.
/// Values outside the range are clamped, NaN maps to the lowest colour.
pub fn viridis(t: f64) -> Colour {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let pos = t * (VIRIDIS.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(VIRIDIS.len() - 1);
    let frac = pos - lower as f64;
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (VIRIDIS[lower], VIRIDIS[upper]);
    Colour(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Viridis colour of `value` on a `0..=max` scale.
pub fn viridis_scaled(value: f64, max: f64) -> Colour {
    if max <= 0.0 {
        viridis(0.0)
    } else {
        viridis(value / max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viridis_endpoints() {
        assert_eq!(viridis(0.0), VIRIDIS[0]);
        assert_eq!(viridis(1.0), VIRIDIS[8]);
        assert_eq!(viridis(2.0), VIRIDIS[8]);
        assert_eq!(viridis(f64::NAN), VIRIDIS[0]);
        assert_eq!(viridis_scaled(5.0, 0.0), VIRIDIS[0]);
    }

    #[test]
    fn test_viridis_is_monotone_in_green() {
        let greens: Vec<u8> = (0..=10).map(|i| viridis(i as f64 / 10.0).1).collect();
        assert!(greens.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_colour_helpers() {
        assert_eq!(GOLD.hex(), "#FFD700");
        assert_eq!(BLACK.lighten(1.0), WHITE);
        assert_eq!(GOLD.text_on(), BLACK);
        assert_eq!(VIRIDIS[0].text_on(), WHITE);
        assert_eq!(medal_colour(MedalType::Bronze), BRONZE);
        assert_eq!(gender_colour("F"), FEMALE);
        assert_eq!(categorical(11), PALETTE[1]);
    }
}
