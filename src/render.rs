//! # Result Rendering
//!
//! Pure mapping from recognized items to display rows. Row order is server
//! order; nothing is re-sorted here.

use std::fmt;

use crate::recognition::ClassificationItem;

pub const UNKNOWN_LABEL: &str = "Unknown";
pub const NO_CONFIDENCE: &str = "--";

/// Single-row markers shown instead of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Before any scan, or after a new selection.
    NotScanned,
    /// A scan succeeded but recognized nothing.
    NoDetections,
    /// The last scan ended in an error.
    Failed,
}

impl Placeholder {
    pub fn message(self) -> &'static str {
        match self {
            Placeholder::NotScanned => "No results yet",
            Placeholder::NoDetections => "No items detected",
            Placeholder::Failed => "Scan failed",
        }
    }
}

/// One recognized item as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub primary: String,
    /// The plain name, when it adds information beyond `primary`.
    pub secondary: Option<String>,
    pub confidence: String,
    pub amount: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayRow {
    Placeholder(Placeholder),
    Item(ItemRow),
}

impl fmt::Display for DisplayRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayRow::Placeholder(placeholder) => f.write_str(placeholder.message()),
            DisplayRow::Item(row) => {
                write!(f, "{}", row.primary)?;
                if let Some(secondary) = &row.secondary {
                    write!(f, " ({})", secondary)?;
                }
                if let Some(amount) = &row.amount {
                    write!(f, " × {}", amount)?;
                }
                write!(f, " {}", row.confidence)
            }
        }
    }
}

/// Render a result set. `None` and empty both yield the no-detections placeholder.
pub fn render(items: Option<&[ClassificationItem]>) -> Vec<DisplayRow> {
    match items {
        Some(items) if !items.is_empty() => items
            .iter()
            .map(|item| DisplayRow::Item(render_item(item)))
            .collect(),
        _ => vec![DisplayRow::Placeholder(Placeholder::NoDetections)],
    }
}

pub fn render_item(item: &ClassificationItem) -> ItemRow {
    let name = non_empty(Some(item.name.as_str()));
    let localized = non_empty(item.localized_name.as_deref());

    let primary = localized.or(name).unwrap_or(UNKNOWN_LABEL).to_string();
    let secondary = match (localized, name) {
        (Some(localized), Some(name)) if localized != name => Some(name.to_string()),
        _ => None,
    };

    ItemRow {
        primary,
        secondary,
        confidence: format_confidence(item.confidence),
        amount: format_amount(item.quantity, item.unit.as_deref()),
    }
}

/// `round_half_up(c * 100)` as a percentage, or `--` when absent.
pub fn format_confidence(confidence: Option<f64>) -> String {
    match confidence.filter(|c| c.is_finite()) {
        Some(c) => format!("{}%", (c * 100.0 + 0.5).floor() as i64),
        None => NO_CONFIDENCE.to_string(),
    }
}

fn format_amount(quantity: Option<f64>, unit: Option<&str>) -> Option<String> {
    let quantity = quantity?;
    Some(match non_empty(unit) {
        Some(unit) => format!("{} {}", quantity, unit),
        None => quantity.to_string(),
    })
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}
