//! The five elements (五行) and their normalized energy distribution.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    /// Canonical enumeration order. Tie-breaks follow this order.
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Fire => "fire",
            Self::Earth => "earth",
            Self::Metal => "metal",
            Self::Water => "water",
        }
    }

    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Wood => "木",
            Self::Fire => "火",
            Self::Earth => "土",
            Self::Metal => "金",
            Self::Water => "水",
        }
    }
}

/// Element energies. Values produced by the engine are non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Elements {
    pub wood: f64,
    pub fire: f64,
    pub earth: f64,
    pub metal: f64,
    pub water: f64,
}

impl Elements {
    #[must_use]
    pub fn get(&self, element: Element) -> f64 {
        match element {
            Element::Wood => self.wood,
            Element::Fire => self.fire,
            Element::Earth => self.earth,
            Element::Metal => self.metal,
            Element::Water => self.water,
        }
    }

    pub fn add(&mut self, element: Element, amount: f64) {
        let slot = match element {
            Element::Wood => &mut self.wood,
            Element::Fire => &mut self.fire,
            Element::Earth => &mut self.earth,
            Element::Metal => &mut self.metal,
            Element::Water => &mut self.water,
        };
        *slot += amount;
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        Element::ALL.iter().map(|&e| self.get(e)).sum()
    }

    /// Scale so the energies sum to 1. A zero total is treated as 1.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn normalized(&self) -> Self {
        let total = self.total();
        let divisor = if total == 0.0 { 1.0 } else { total };
        Self {
            wood: self.wood / divisor,
            fire: self.fire / divisor,
            earth: self.earth / divisor,
            metal: self.metal / divisor,
            water: self.water / divisor,
        }
    }

    /// The strongest element; on exact ties the earlier one in [`Element::ALL`] wins.
    #[must_use]
    pub fn dominant(&self) -> Element {
        let mut best = Element::Earth;
        let mut best_value = f64::NEG_INFINITY;
        for element in Element::ALL {
            let value = self.get(element);
            if value > best_value {
                best_value = value;
                best = element;
            }
        }
        best
    }

    #[must_use]
    pub fn as_array(&self) -> [f64; 5] {
        [self.wood, self.fire, self.earth, self.metal, self.water]
    }
}
