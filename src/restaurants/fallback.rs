use rand::seq::SliceRandom;
use rand::Rng;

use super::cuisine::Cuisine;

const STOCK_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1517248135467-4c7edcad34c4?w=800",
    "https://images.unsplash.com/photo-1555396273-367ea4eb4db5?w=800",
    "https://images.unsplash.com/photo-1414235077428-338989a2e8c0?w=800",
    "https://images.unsplash.com/photo-1552566626-52f8b828add9?w=800",
    "https://images.unsplash.com/photo-1466978913421-dad2ebd01d17?w=800",
];

/// Demo values used when upstream data is missing.
///
/// These stand in for real data; a deployment that wants no synthetic
/// values plugs in its own source.
pub trait FallbackSource: Send + Sync {
    /// In `[3.5, 5.0)`.
    fn rating(&self) -> f64;
    /// In `1..=3`.
    fn price_level(&self) -> u8;
    fn special_dish(&self, cuisine: Cuisine) -> String;
    fn stock_image(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomFallback;

impl FallbackSource for RandomFallback {
    fn rating(&self) -> f64 {
        3.5 + rand::thread_rng().gen::<f64>() * 1.5
    }

    fn price_level(&self) -> u8 {
        rand::thread_rng().gen_range(1..=3)
    }

    fn special_dish(&self, cuisine: Cuisine) -> String {
        cuisine
            .special_dishes()
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("Chef's Special")
            .to_string()
    }

    fn stock_image(&self) -> String {
        STOCK_IMAGES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(STOCK_IMAGES[0])
            .to_string()
    }
}

/// Deterministic values, for tests.
#[cfg(test)]
pub(crate) struct FixedFallback;

#[cfg(test)]
impl FallbackSource for FixedFallback {
    fn rating(&self) -> f64 {
        4.2
    }
    fn price_level(&self) -> u8 {
        2
    }
    fn special_dish(&self, cuisine: Cuisine) -> String {
        cuisine.special_dishes()[0].to_string()
    }
    fn stock_image(&self) -> String {
        STOCK_IMAGES[0].to_string()
    }
}
