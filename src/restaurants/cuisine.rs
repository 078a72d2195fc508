use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cuisine {
    Italian,
    Japanese,
    Mexican,
    Indian,
    Chinese,
    Thai,
    Cafe,
    American,
}

// Checked in order; first keyword hit wins.
const KEYWORDS: &[(&str, Cuisine)] = &[
    ("pizza", Cuisine::Italian),
    ("italian", Cuisine::Italian),
    ("trattoria", Cuisine::Italian),
    ("pasta", Cuisine::Italian),
    ("sushi", Cuisine::Japanese),
    ("ramen", Cuisine::Japanese),
    ("japanese", Cuisine::Japanese),
    ("izakaya", Cuisine::Japanese),
    ("taco", Cuisine::Mexican),
    ("mexican", Cuisine::Mexican),
    ("burrito", Cuisine::Mexican),
    ("cantina", Cuisine::Mexican),
    ("curry", Cuisine::Indian),
    ("indian", Cuisine::Indian),
    ("tandoor", Cuisine::Indian),
    ("masala", Cuisine::Indian),
    ("chinese", Cuisine::Chinese),
    ("dim sum", Cuisine::Chinese),
    ("dumpling", Cuisine::Chinese),
    ("wok", Cuisine::Chinese),
    ("thai", Cuisine::Thai),
    ("pad thai", Cuisine::Thai),
    ("cafe", Cuisine::Cafe),
    ("café", Cuisine::Cafe),
    ("coffee", Cuisine::Cafe),
    ("bakery", Cuisine::Cafe),
];

impl Cuisine {
    /// Infer from the place name first, then from its upstream types.
    pub fn infer(name: &str, types: &[String]) -> Self {
        let name = name.to_lowercase();
        if let Some(c) = Self::match_keyword(&name) {
            return c;
        }
        types
            .iter()
            .find_map(|t| Self::match_keyword(&t.replace('_', " ")))
            .unwrap_or(Cuisine::American)
    }

    fn match_keyword(haystack: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(kw, _)| haystack.contains(kw))
            .map(|(_, c)| *c)
    }

    pub fn label(self) -> &'static str {
        match self {
            Cuisine::Italian => "Italian",
            Cuisine::Japanese => "Japanese",
            Cuisine::Mexican => "Mexican",
            Cuisine::Indian => "Indian",
            Cuisine::Chinese => "Chinese",
            Cuisine::Thai => "Thai",
            Cuisine::Cafe => "Cafe",
            Cuisine::American => "American",
        }
    }

    pub fn special_dishes(self) -> &'static [&'static str] {
        match self {
            Cuisine::Italian => &["Truffle Mushroom Risotto", "Margherita Pizza", "Spaghetti Carbonara", "Osso Buco"],
            Cuisine::Japanese => &["Chef's Omakase Platter", "Tonkotsu Ramen", "Dragon Roll", "Chicken Katsu Curry"],
            Cuisine::Mexican => &["Birria Tacos", "Mole Poblano", "Carnitas Burrito", "Elote Street Corn"],
            Cuisine::Indian => &["Butter Chicken", "Lamb Rogan Josh", "Paneer Tikka Masala", "Hyderabadi Biryani"],
            Cuisine::Chinese => &["Peking Duck", "Xiao Long Bao", "Kung Pao Chicken", "Mapo Tofu"],
            Cuisine::Thai => &["Pad Thai", "Green Curry", "Tom Yum Goong", "Mango Sticky Rice"],
            Cuisine::Cafe => &["Avocado Toast", "Almond Croissant", "Shakshuka", "Matcha Latte"],
            Cuisine::American => &["Smash Burger", "BBQ Brisket", "Buffalo Wings", "Mac and Cheese"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(ts: &[&str]) -> Vec<String> {
        ts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn name_keywords_win() {
        assert_eq!(Cuisine::infer("Tony's Pizza Napoletana", &types(&["cafe"])), Cuisine::Italian);
        assert_eq!(Cuisine::infer("Ramen Nakamura", &[]), Cuisine::Japanese);
    }

    #[test]
    fn falls_back_to_types_then_american() {
        assert_eq!(Cuisine::infer("Blue Door", &types(&["cafe", "food"])), Cuisine::Cafe);
        assert_eq!(Cuisine::infer("Blue Door", &types(&["restaurant", "food"])), Cuisine::American);
    }

    #[test]
    fn every_cuisine_has_dishes() {
        for c in [
            Cuisine::Italian,
            Cuisine::Japanese,
            Cuisine::Mexican,
            Cuisine::Indian,
            Cuisine::Chinese,
            Cuisine::Thai,
            Cuisine::Cafe,
            Cuisine::American,
        ] {
            assert!(!c.special_dishes().is_empty(), "{c:?}");
        }
    }
}
