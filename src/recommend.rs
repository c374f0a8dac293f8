//! Static product recommendations.
//!
//! A fixed lookup table keyed by detection category. There is no logic here
//! beyond the lookup; the tables are compiled in and never change at runtime.

use crate::detect::result::Category;

/// One recommendable product.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Product {
    pub name: &'static str,
    /// Whole-dollar list price.
    pub price_usd: u32,
}

const BACKPACKS: [Product; 4] = [
    Product {
        name: "Nike Air Max Backpack",
        price_usd: 89,
    },
    Product {
        name: "Adidas Classic 3-Stripes",
        price_usd: 45,
    },
    Product {
        name: "JanSport SuperBreak",
        price_usd: 35,
    },
    Product {
        name: "Under Armour Hustle",
        price_usd: 55,
    },
];

const HANDBAGS: [Product; 4] = [
    Product {
        name: "Michael Kors Jet Set",
        price_usd: 178,
    },
    Product {
        name: "Coach Signature Tote",
        price_usd: 250,
    },
    Product {
        name: "Kate Spade Cameron",
        price_usd: 128,
    },
    Product {
        name: "Marc Jacobs Tote",
        price_usd: 195,
    },
];

const WALLETS: [Product; 4] = [
    Product {
        name: "Bellroy Slim Sleeve",
        price_usd: 89,
    },
    Product {
        name: "Ridge Carbon Fiber",
        price_usd: 105,
    },
    Product {
        name: "Fossil Leather Bifold",
        price_usd: 45,
    },
    Product {
        name: "Herschel Charlie",
        price_usd: 25,
    },
];

/// Recommendations for a classified category.
pub fn for_category(category: Category) -> &'static [Product; 4] {
    match category {
        Category::Backpack => &BACKPACKS,
        Category::Handbag => &HANDBAGS,
        Category::Wallet => &WALLETS,
    }
}

/// Label-keyed lookup. Unknown labels have no recommendations.
pub fn lookup(label: &str) -> Option<&'static [Product; 4]> {
    match label {
        "backpack" => Some(&BACKPACKS),
        "handbag" => Some(&HANDBAGS),
        "wallet" => Some(&WALLETS),
        _ => None,
    }
}
