use std::collections::BTreeMap;

/// Built-in icon set, grouped by food category
///
/// Rebuilt identically on every start, so it is never persisted.
const BUILTIN: &[(&str, &[&str])] = &[
    ("Bakery", &["mousse cake", "bread 1", "bread", "sandwich 1", "sandwich", "white bread", "gingerbread man", "cake 1", "cake", "croissant"]),
    ("Beverage", &["latte", "beer", "water", "champagne", "watermelon juice", "sikhye", "almond milk", "energy drink", "orange juice", "wine", "coffee beans", "cafe drink", "coffee capsule", "cola", "sparkling water", "matcha", "brewed tea", "tea bag 1", "tea bag"]),
    ("Canned", &["can"]),
    ("Dairy", &["egg 1", "egg 2", "egg", "butter", "milk 1", "milk 2", "milk 3", "milk", "cheese"]),
    ("Dishes", &["rolled omelette", "fried egg", "gimbap", "boiled egg", "donut", "tteokbokki", "dumplings", "bossam", "samgyetang", "bibimbap", "sandwich", "songpyeon", "energy bar", "stew", "kongguksu", "fritters", "pancake", "pizza", "hot dog 1", "hamburger"]),
    ("Frozen", &["french fries 1", "french fries 2", "french fries", "ice cream", "ice cream 1", "ice cream 3", "ice cream cone"]),
    ("Fruit", &["persimmon", "strawberry", "lemon", "mango", "fig", "peach", "blueberry", "apple", "apricot", "pomegranate", "cut watermelon", "orange", "grapefruit", "cherry", "kiwi", "grape", "pineapple"]),
    ("Grains & Nuts", &["peanut", "flour 1", "flour 2", "flour", "almond", "walnut"]),
    ("Meat", &["meat 1", "meat", "chicken", "bacon", "sausage 1", "sausage", "ham"]),
    ("Medicine", &["pill", "medicine 1", "medicine"]),
    ("Noodles", &["ramen", "pet food"]),
    ("Pets", &["dog treat"]),
    ("Sauces", &["gochujang", "honey 1", "honey", "mayonnaise", "mustard", "apple jam", "sauce 1", "sauce", "syrup", "vinegar", "sauce packet", "jam", "chili sauce"]),
    ("Seafood", &["crab", "fish 1", "fish", "fish fillet", "fish cake", "squid", "eel", "clam", "sashimi"]),
    ("Snacks", &["chips", "snack mix", "nachos", "candy", "chocolate", "crackers", "popcorn"]),
    ("Spices", &["cinnamon", "vanilla", "oil", "cooking oil 1", "cooking oil", "seasoning", "coconut oil", "msg", "food coloring"]),
    ("Vegetable", &["eggplant", "chili", "chili 2", "chard", "carrot 1", "carrot", "dill", "garlic 1", "garlic", "mushroom 1", "mushroom", "broccoli", "celery", "spinach", "avocado", "asparagus", "zucchini", "cabbage", "onion", "endive", "cucumber", "corn", "red cabbage", "cauliflower", "beans", "tomato", "green onion", "paprika", "red beans", "pumpkin", "parsley", "mint"]),
];

/// Category → icon names lookup, read-only once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCatalog {
    entries: BTreeMap<String, Vec<String>>,
}

impl ImageCatalog {
    /// The icon set shipped with the app
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN.iter().map(|(category, icons)| {
            (
                category.to_string(),
                icons.iter().map(|icon| icon.to_string()).collect::<Vec<_>>(),
            )
        }))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Filter every category's icons by a case-sensitive substring
    ///
    /// Categories left with no icons are dropped. An empty query returns
    /// the whole catalog.
    pub fn search(&self, query: &str) -> BTreeMap<String, Vec<String>> {
        if query.is_empty() {
            return self.entries.clone();
        }

        self.entries
            .iter()
            .filter_map(|(category, icons)| {
                let matches: Vec<String> = icons
                    .iter()
                    .filter(|icon| icon.contains(query))
                    .cloned()
                    .collect();
                if matches.is_empty() {
                    None
                } else {
                    Some((category.clone(), matches))
                }
            })
            .collect()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn icons(&self, category: &str) -> &[String] {
        self.entries
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_icon(&self, name: &str) -> bool {
        self.entries.values().any(|icons| icons.iter().any(|i| i == name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ImageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_catalog() -> ImageCatalog {
        ImageCatalog::from_entries(vec![
            ("Dairy".to_string(), vec!["milk".to_string(), "Milk tea".to_string(), "cheese".to_string()]),
            ("Fruit".to_string(), vec!["apple".to_string(), "lemon".to_string()]),
        ])
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let catalog = small_catalog();
        let all = catalog.search("");
        assert_eq!(all.len(), 2);
        assert_eq!(all["Dairy"].len(), 3);
    }

    #[test]
    fn test_search_is_case_sensitive_and_drops_empty_categories() {
        let catalog = small_catalog();
        let hits = catalog.search("milk");

        assert_eq!(hits.len(), 1);
        assert_eq!(hits["Dairy"], vec!["milk".to_string()]);
        assert!(!hits.contains_key("Fruit"));
    }

    #[test]
    fn test_search_keeps_icon_order() {
        let catalog = ImageCatalog::builtin();
        let hits = catalog.search("carrot");
        assert_eq!(hits["Vegetable"], vec!["carrot 1".to_string(), "carrot".to_string()]);
    }

    #[test]
    fn test_no_match() {
        assert!(small_catalog().search("kimchi").is_empty());
    }

    #[test]
    fn test_builtin_is_stable() {
        assert_eq!(ImageCatalog::builtin(), ImageCatalog::builtin());
        assert!(ImageCatalog::builtin().contains_icon("tomato"));
        assert!(ImageCatalog::builtin().icons("Unknown").is_empty());
    }
}
