use std::collections::HashMap;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

const DEFAULT_ALIASES: &[(&str, &[&str])] = &[
    ("Tech", &["Technology", "Tech", "Computing"]),
    ("Food", &["Foodi", "Food", "Cooking"]),
    ("Travel", &["Travel", "Places"]),
    ("Business", &["Business", "Startup"]),
    ("Gaming", &["Gaming", "Games"]),
    ("Fashion", &["Fashion", "Style"]),
];

/// Maps a user-facing category to the stored category strings it covers.
#[derive(Debug, Clone)]
pub struct CategoryAliases {
    aliases: HashMap<String, Vec<String>>,
}

impl CategoryAliases {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let aliases = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into_iter().map(Into::into).collect()))
            .collect();
        Self { aliases }
    }

    /// Stored category strings accepted for `category`. `None` means no filter.
    /// Unmapped categories match only themselves.
    pub fn resolve(&self, category: Option<&str>) -> Option<Vec<String>> {
        let category = category.filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)?;
        Some(match self.aliases.get(category) {
            Some(stored) => stored.clone(),
            None => vec![category.to_string()],
        })
    }
}

impl Default for CategoryAliases {
    fn default() -> Self {
        Self::new(DEFAULT_ALIASES.iter().map(|(k, v)| (*k, v.to_vec())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_and_blank_mean_no_filter() {
        let aliases = CategoryAliases::default();
        assert_eq!(aliases.resolve(Some("All")), None);
        assert_eq!(aliases.resolve(Some("")), None);
        assert_eq!(aliases.resolve(None), None);
    }

    #[test]
    fn mapped_and_literal_categories() {
        let aliases = CategoryAliases::default();
        assert_eq!(aliases.resolve(Some("Tech")).unwrap(), vec!["Technology", "Tech", "Computing"]);
        assert_eq!(aliases.resolve(Some("Obscure")).unwrap(), vec!["Obscure"]);
    }
}
