use serde::{Deserialize, Deserializer};

// ============================================================================
// Article
// ============================================================================

/// A single headline as returned by the aggregator.
///
/// Articles are never mutated after they are fetched. Translation produces a
/// new `Article` via [`Article::with_field`].
///
/// Every field except `title` is optional in the upstream payload; a `null`
/// or missing title deserializes as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
}

/// The three translatable text fields of an [`Article`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Content,
}

impl Field {
    /// All translatable fields, in the order they are processed.
    pub const ALL: [Field; 3] = [Field::Title, Field::Description, Field::Content];

    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Content => "content",
        }
    }
}

impl Article {
    /// Text of a translatable field, if present.
    pub fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Title => Some(self.title.as_str()),
            Field::Description => self.description.as_deref(),
            Field::Content => self.content.as_deref(),
        }
    }

    /// Return a copy with one translatable field replaced.
    pub fn with_field(&self, field: Field, text: String) -> Self {
        let mut copy = self.clone();
        match field {
            Field::Title => copy.title = text,
            Field::Description => copy.description = Some(text),
            Field::Content => copy.content = Some(text),
        }
        copy
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Category
// ============================================================================

/// Topic filter sent to the headline aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    General,
    Business,
    Technology,
    Sports,
    Science,
    Entertainment,
    Health,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Business,
        Category::Technology,
        Category::Sports,
        Category::Science,
        Category::Entertainment,
        Category::Health,
    ];

    /// Display name, also used verbatim as the `category` query parameter.
    pub fn name(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Business => "Business",
            Self::Technology => "Technology",
            Self::Sports => "Sports",
            Self::Science => "Science",
            Self::Entertainment => "Entertainment",
            Self::Health => "Health",
        }
    }

    /// Parse a category name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    /// Next category, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous category, wrapping around.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_article_deserializes_camel_case() {
        let json = r#"{
            "title": "A",
            "description": "desc",
            "content": null,
            "publishedAt": "2024-05-01T10:00:00Z",
            "url": "https://example.com/a",
            "urlToImage": "https://example.com/a.jpg"
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.title, "A");
        assert_eq!(article.description.as_deref(), Some("desc"));
        assert_eq!(article.content, None);
        assert_eq!(article.published_at.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(article.url_to_image.as_deref(), Some("https://example.com/a.jpg"));
    }

    #[test]
    fn test_null_title_becomes_empty() {
        let article: Article = serde_json::from_str(r#"{"title": null}"#).unwrap();
        assert_eq!(article.title, "");
        let article: Article = serde_json::from_str("{}").unwrap();
        assert_eq!(article.title, "");
    }

    #[test]
    fn test_with_field_leaves_original_untouched() {
        let original = Article {
            title: "Hello".into(),
            description: Some("World".into()),
            ..Default::default()
        };
        let copy = original.with_field(Field::Title, "Bonjour".into());
        assert_eq!(copy.title, "Bonjour");
        assert_eq!(copy.description.as_deref(), Some("World"));
        assert_eq!(original.title, "Hello");
    }

    #[test]
    fn test_category_cycle_wraps() {
        assert_eq!(Category::General.prev(), Category::Health);
        assert_eq!(Category::Health.next(), Category::General);
        let mut c = Category::General;
        for _ in 0..Category::ALL.len() {
            c = c.next();
        }
        assert_eq!(c, Category::General);
    }

    #[test]
    fn test_category_from_str_name() {
        assert_eq!(Category::from_str_name("technology"), Some(Category::Technology));
        assert_eq!(Category::from_str_name(" Sports "), Some(Category::Sports));
        assert_eq!(Category::from_str_name("weather"), None);
    }
}
