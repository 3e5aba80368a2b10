//! Display rules: unit nouns and confirmation phrasing.
//!
//! Nothing here touches stored state. The ledger returns a [`Confirmation`]
//! describing what happened and the presentation layer renders it with
//! whatever [`UnitNouns`] it was configured with.

use std::str::FromStr;

use serde::Serialize;

use crate::error::DomainError;
use crate::product::{Product, ProductName, Quantity};

/// Maps a keyword found in a product name to the noun used for its units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRule {
    keyword: String,
    noun: String,
}

impl UnitRule {
    pub fn new(keyword: impl Into<String>, noun: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into().to_lowercase(),
            noun: noun.into(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        name.to_lowercase().contains(&self.keyword)
    }
}

/// Parses `keyword=noun`.
impl FromStr for UnitRule {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (keyword, noun) = s
            .split_once('=')
            .ok_or_else(|| DomainError::validation(format!("unit rule '{s}' must look like keyword=noun")))?;
        let (keyword, noun) = (keyword.trim(), noun.trim());
        if keyword.is_empty() || noun.is_empty() {
            return Err(DomainError::validation(format!(
                "unit rule '{s}' needs both a keyword and a noun"
            )));
        }
        Ok(Self::new(keyword, noun))
    }
}

/// Ordered unit-noun lookup. The first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitNouns {
    rules: Vec<UnitRule>,
    default: String,
}

impl UnitNouns {
    pub fn new(rules: Vec<UnitRule>, default: impl Into<String>) -> Self {
        Self {
            rules,
            default: default.into(),
        }
    }

    /// Parse a comma-separated rule list such as `"bakers=bags, chenga=sacks"`.
    /// Empty segments are ignored.
    pub fn parse(rules: &str, default: impl Into<String>) -> Result<Self, DomainError> {
        let rules = rules
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(UnitRule::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules, default))
    }

    pub fn noun_for(&self, name: &str) -> &str {
        self.rules
            .iter()
            .find(|r| r.matches(name))
            .map(|r| r.noun.as_str())
            .unwrap_or(self.default.as_str())
    }

    /// One line of the stock listing, e.g. `Bakers 25kg: 4 bags (25 kg each).`
    pub fn stock_line(&self, product: &Product) -> String {
        let noun = self.noun_for(product.name.as_str());
        match product.weight {
            Some(w) => format!("{}: {} {} ({} kg each).", product.name, product.quantity, noun, w),
            None => format!("{}: {} {}.", product.name, product.quantity, noun),
        }
    }
}

impl Default for UnitNouns {
    fn default() -> Self {
        Self::new(vec![UnitRule::new("bakers", "bags")], "bales")
    }
}

/// Outcome of a successful ledger mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Confirmation {
    Added { name: ProductName, quantity: Quantity },
    Sold { name: ProductName, quantity: Quantity },
    Reduced { name: ProductName, quantity: Quantity },
    Lowered { name: ProductName, quantity: Quantity },
    Removed { name: ProductName, existed: bool },
}

impl Confirmation {
    pub fn name(&self) -> &ProductName {
        match self {
            Confirmation::Added { name, .. }
            | Confirmation::Sold { name, .. }
            | Confirmation::Reduced { name, .. }
            | Confirmation::Lowered { name, .. }
            | Confirmation::Removed { name, .. } => name,
        }
    }

    pub fn render(&self, nouns: &UnitNouns) -> String {
        match self {
            Confirmation::Added { name, quantity } => format!(
                "Product '{name}' (Quantity: {quantity} {}) added successfully.",
                nouns.noun_for(name.as_str())
            ),
            Confirmation::Sold { name, quantity } => {
                format!("{quantity} {} of '{name}' sold.", nouns.noun_for(name.as_str()))
            }
            Confirmation::Reduced { name, quantity } => {
                format!("Quantity of product '{name}' reduced by {quantity} units.")
            }
            Confirmation::Lowered { name, quantity } => {
                format!("Quantity of product '{name}' set to {quantity} units.")
            }
            Confirmation::Removed { name, existed: true } => {
                format!("Product '{name}' deleted successfully.")
            }
            Confirmation::Removed { name, existed: false } => {
                format!("Product '{name}' was not in inventory; nothing deleted.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Weight;

    fn name(s: &str) -> ProductName {
        ProductName::parse(s).unwrap()
    }

    fn qty(n: i64) -> Quantity {
        Quantity::positive(n).unwrap()
    }

    #[test]
    fn default_nouns_follow_bakers_convention() {
        let nouns = UnitNouns::default();
        assert_eq!(nouns.noun_for("Bakers 25kg"), "bags");
        assert_eq!(nouns.noun_for("bakers 50kg"), "bags");
        assert_eq!(nouns.noun_for("Taifa 1kg"), "bales");
    }

    #[test]
    fn first_matching_rule_wins() {
        let nouns = UnitNouns::parse("taifa=packets, 1kg=bundles", "units").unwrap();
        assert_eq!(nouns.noun_for("Taifa 1kg"), "packets");
        assert_eq!(nouns.noun_for("Bahari 1kg"), "bundles");
        assert_eq!(nouns.noun_for("Chenga 2kg"), "units");
    }

    #[test]
    fn malformed_rules_are_rejected() {
        assert!(UnitNouns::parse("bakers", "bales").is_err());
        assert!(UnitNouns::parse("=bags", "bales").is_err());
        assert!(UnitNouns::parse("bakers=", "bales").is_err());
        assert_eq!(UnitNouns::parse(" , ", "bales").unwrap().noun_for("x"), "bales");
    }

    #[test]
    fn confirmations_pick_nouns_without_touching_quantities() {
        let nouns = UnitNouns::default();
        assert_eq!(
            Confirmation::Added { name: name("bakers 25kg"), quantity: qty(3) }.render(&nouns),
            "Product 'Bakers 25kg' (Quantity: 3 bags) added successfully."
        );
        assert_eq!(
            Confirmation::Sold { name: name("taifa 1kg"), quantity: qty(2) }.render(&nouns),
            "2 bales of 'Taifa 1kg' sold."
        );
        assert_eq!(
            Confirmation::Reduced { name: name("flour"), quantity: qty(5) }.render(&nouns),
            "Quantity of product 'Flour' reduced by 5 units."
        );
        assert_eq!(
            Confirmation::Lowered {
                name: name("flour"),
                quantity: Quantity::non_negative(0).unwrap()
            }
            .render(&nouns),
            "Quantity of product 'Flour' set to 0 units."
        );
        assert_eq!(
            Confirmation::Removed { name: name("flour"), existed: false }.render(&nouns),
            "Product 'Flour' was not in inventory; nothing deleted."
        );
    }

    #[test]
    fn stock_line_mentions_weight_when_known() {
        let nouns = UnitNouns::default();
        let plain = Product::new(name("taifa 2kg"), 7, None);
        let weighed = Product::new(name("bakers 12.5kg"), 4, Some(Weight::new(12.5).unwrap()));
        assert_eq!(nouns.stock_line(&plain), "Taifa 2kg: 7 bales.");
        assert_eq!(nouns.stock_line(&weighed), "Bakers 12.5kg: 4 bags (12.5 kg each).");
    }
}
