use serde::{Deserialize, Serialize};
use std::fmt;

/// One line of a shopping list: the summed quantity of an ingredient in one unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    /// Smallest ingredient id among the records merged into this item
    pub ingredient_id: String,
    pub name: String,
    pub unit: String,
    pub quantity: f64,
}

impl fmt::Display for ShoppingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{:<25} {}", self.name, format_quantity(self.quantity))
        } else {
            write!(
                f,
                "{:<25} {} {}",
                self.name,
                format_quantity(self.quantity),
                self.unit
            )
        }
    }
}

/// Render a quantity without a trailing ".0" for whole numbers.
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        let rounded = format!("{:.2}", quantity);
        rounded
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}
