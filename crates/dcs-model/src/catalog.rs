//! Condition catalog: the ordered taxonomy shown in the condition picker.
//!
//! ## Structure
//!
//! - **Categories** keep insertion order; that order is the display order.
//! - **Items** belong to one category but their keys are globally unique, so
//!   lookup by key searches every category.
//!
//! The standard catalog is built once and shared through
//! [`ConditionCatalog::standard`].

use std::collections::BTreeSet;
use std::sync::LazyLock;

use serde::Serialize;

use crate::condition::Condition;
use crate::enums::ConditionScope;
use crate::error::{ModelError, Result};

/// A single pickable condition with its rendering metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionItem {
    pub condition: Condition,
    pub key: &'static str,
    pub label: &'static str,
    pub scope: ConditionScope,
    /// CSS-style class applied to the tooth group or surface cell.
    pub render_class: &'static str,
    pub color: &'static str,
    pub text_color: Option<&'static str>,
    /// Loose terms an assist pipeline may use for this condition.
    pub keywords: &'static [&'static str],
}

impl ConditionItem {
    fn new(
        condition: Condition,
        label: &'static str,
        color: &'static str,
        keywords: &'static [&'static str],
    ) -> Self {
        Self {
            condition,
            key: condition.key(),
            label,
            scope: condition.scope(),
            render_class: condition.key(),
            color,
            text_color: None,
            keywords,
        }
    }

    fn with_text_color(mut self, text_color: &'static str) -> Self {
        self.text_color = Some(text_color);
        self
    }

    /// Text colour for labels drawn on this item's colour.
    pub fn text_color_or_default(&self) -> &'static str {
        self.text_color.unwrap_or(DEFAULT_TEXT_COLOR)
    }

    fn matches_term(&self, term: &str) -> bool {
        self.key.eq_ignore_ascii_case(term)
            || self.label.eq_ignore_ascii_case(term)
            || self.keywords.iter().any(|kw| kw.eq_ignore_ascii_case(term))
    }
}

/// Default label colour when an item does not define one.
pub const DEFAULT_TEXT_COLOR: &str = "#1f2937";

/// An ordered group of condition items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionCategory {
    pub key: &'static str,
    pub label: &'static str,
    pub items: Vec<ConditionItem>,
}

/// Read-only condition taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionCatalog {
    categories: Vec<ConditionCategory>,
}

static STANDARD_CATALOG: LazyLock<ConditionCatalog> = LazyLock::new(build_standard_catalog);

impl ConditionCatalog {
    /// Build a catalog, rejecting duplicate keys across categories.
    pub fn from_categories(categories: Vec<ConditionCategory>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for item in categories.iter().flat_map(|category| &category.items) {
            if !seen.insert(item.key) {
                return Err(ModelError::DuplicateConditionKey(item.key.to_string()));
            }
        }
        Ok(Self { categories })
    }

    /// The catalog shipped with the chart.
    pub fn standard() -> &'static ConditionCatalog {
        &STANDARD_CATALOG
    }

    /// Categories in display order.
    pub fn categories(&self) -> &[ConditionCategory] {
        &self.categories
    }

    /// All items in display order.
    pub fn items(&self) -> impl Iterator<Item = &ConditionItem> {
        self.categories
            .iter()
            .flat_map(|category| category.items.iter())
    }

    /// Look up an item by key across all categories.
    pub fn lookup(&self, key: &str) -> Option<&ConditionItem> {
        let key = key.trim();
        self.items().find(|item| item.key.eq_ignore_ascii_case(key))
    }

    /// Look up the item for a typed condition.
    pub fn item(&self, condition: Condition) -> Option<&ConditionItem> {
        self.items().find(|item| item.condition == condition)
    }

    /// Resolve a loose term (key, label or keyword) to the first matching
    /// item in display order.
    pub fn resolve_keyword(&self, term: &str) -> Option<&ConditionItem> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }
        self.lookup(term)
            .or_else(|| self.items().find(|item| item.matches_term(term)))
    }

    /// Label for a condition, falling back to its key.
    pub fn label(&self, condition: Condition) -> &'static str {
        self.item(condition).map_or(condition.key(), |item| item.label)
    }
}

fn build_standard_catalog() -> ConditionCatalog {
    let categories = vec![
        ConditionCategory {
            key: "pathology",
            label: "Pathology",
            items: vec![
                ConditionItem::new(
                    Condition::Caries,
                    "Caries",
                    "#c91c1c",
                    &["caries", "decay", "dk"],
                )
                .with_text_color("#fff"),
                ConditionItem::new(
                    Condition::Fracture,
                    "Fracture",
                    "#fed7aa",
                    &["fracture", "fractured", "broken"],
                ),
                ConditionItem::new(
                    Condition::RootFragment,
                    "Root Fragment",
                    "#fecaca",
                    &["root", "fragment"],
                ),
            ],
        },
        ConditionCategory {
            key: "restorations",
            label: "Restorations",
            items: vec![
                ConditionItem::new(
                    Condition::Amalgam,
                    "Amalgam",
                    "#9ca3af",
                    &["amalgam", "silver"],
                ),
                ConditionItem::new(
                    Condition::Composite,
                    "Composite",
                    "#a5f3fc",
                    &["composite", "white", "filling"],
                ),
                ConditionItem::new(
                    Condition::GlassIonomer,
                    "Glass Ionomer",
                    "#fef08a",
                    &["gi", "glass"],
                ),
                ConditionItem::new(Condition::Gold, "Gold", "#facc15", &["gold"]),
                ConditionItem::new(Condition::Crown, "Crown", "#fde047", &["crown"]),
                ConditionItem::new(
                    Condition::Sealant,
                    "Sealant",
                    "#a7f3d0",
                    &["sealant", "fs"],
                ),
            ],
        },
        ConditionCategory {
            key: "treatmentsAndStatus",
            label: "Status & Treatments",
            items: vec![
                ConditionItem::new(
                    Condition::Missing,
                    "Missing",
                    "#e5e7eb",
                    &["missing", "extracted", "clear", "sound", "reset"],
                ),
                ConditionItem::new(
                    Condition::ToBeExtracted,
                    "To Be Extracted",
                    "#fda4af",
                    &["extract", "tbe"],
                ),
                ConditionItem::new(Condition::Impacted, "Impacted", "#e9d5ff", &["impacted"]),
                ConditionItem::new(
                    Condition::Unerupted,
                    "Unerupted",
                    "#bfdbfe",
                    &["unerupted"],
                ),
                ConditionItem::new(
                    Condition::PartiallyErupted,
                    "Partially Erupted",
                    "#93c5fd",
                    &["partially"],
                ),
                ConditionItem::new(
                    Condition::Rct,
                    "Root Canal",
                    "#fecaca",
                    &["rct", "root canal", "endo"],
                ),
                ConditionItem::new(Condition::Implant, "Implant", "#c4b5fd", &["implant"]),
                ConditionItem::new(
                    Condition::BridgePontic,
                    "Bridge Pontic",
                    "#e5e7eb",
                    &["pontic", "bridge"],
                ),
            ],
        },
    ];
    ConditionCatalog { categories }
}
