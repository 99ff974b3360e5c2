use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// The seven persisted fields of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArticleField {
    Title,
    Author,
    Excerpt,
    Genre,
    Image,
    PublishDate,
    Body,
}

impl ArticleField {
    pub const ALL: [ArticleField; 7] = [
        ArticleField::Title,
        ArticleField::Author,
        ArticleField::Excerpt,
        ArticleField::Genre,
        ArticleField::Image,
        ArticleField::PublishDate,
        ArticleField::Body,
    ];

    /// Placeholder stored in place of a value the page did not provide.
    pub fn sentinel(&self) -> &'static str {
        match self {
            ArticleField::Title => "No Title Found",
            ArticleField::Author => "No Author Found",
            ArticleField::Excerpt => "No Excerpt Found",
            ArticleField::Genre => "No Genre Found",
            ArticleField::Image => "No Image Found",
            ArticleField::PublishDate => "No Publish Date Found",
            ArticleField::Body => "No Body Found",
        }
    }

    /// Key used for this field in JSON and storage columns.
    pub fn key(&self) -> &'static str {
        match self {
            ArticleField::Title => "title",
            ArticleField::Author => "author",
            ArticleField::Excerpt => "excerpt",
            ArticleField::Genre => "genre",
            ArticleField::Image => "image",
            ArticleField::PublishDate => "publish_date",
            ArticleField::Body => "body",
        }
    }
}

impl fmt::Display for ArticleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// An extracted value, or the marker for a field that could not be found.
///
/// Serializes as a plain string: the value itself, or the field's sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Found(String),
    Missing(ArticleField),
}

impl Field {
    pub fn from_option(field: ArticleField, value: Option<String>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => Field::Found(v),
            _ => Field::Missing(field),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Field::Found(v) => v,
            Field::Missing(field) => field.sentinel(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Field::Found(v) if !v.trim().is_empty())
    }

    pub fn into_value(self) -> Option<String> {
        match self {
            Field::Found(v) if !v.trim().is_empty() => Some(v),
            _ => None,
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Result of running the field extractor over one article page.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapedArticle {
    pub url: String,
    pub title: Field,
    pub author: Field,
    pub excerpt: Field,
    pub genre: Field,
    pub image: Field,
    pub publish_date: Field,
    pub body: Field,
}

impl ScrapedArticle {
    pub fn field(&self, field: ArticleField) -> &Field {
        match field {
            ArticleField::Title => &self.title,
            ArticleField::Author => &self.author,
            ArticleField::Excerpt => &self.excerpt,
            ArticleField::Genre => &self.genre,
            ArticleField::Image => &self.image,
            ArticleField::PublishDate => &self.publish_date,
            ArticleField::Body => &self.body,
        }
    }

    pub fn missing_fields(&self) -> Vec<ArticleField> {
        ArticleField::ALL
            .into_iter()
            .filter(|f| !self.field(*f).is_found())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Applies the completeness filter: every field must hold a real value.
    pub fn into_record(self) -> Option<ArticleRecord> {
        Some(ArticleRecord {
            title: self.title.into_value()?,
            author: self.author.into_value()?,
            excerpt: self.excerpt.into_value()?,
            genre: self.genre.into_value()?,
            image: self.image.into_value()?,
            publish_date: self.publish_date.into_value()?,
            body: self.body.into_value()?,
        })
    }
}

/// A complete article, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub author: String,
    pub excerpt: String,
    pub genre: String,
    pub image: String,
    pub publish_date: String,
    pub body: String,
}

impl ArticleRecord {
    pub fn value(&self, field: ArticleField) -> &str {
        match field {
            ArticleField::Title => &self.title,
            ArticleField::Author => &self.author,
            ArticleField::Excerpt => &self.excerpt,
            ArticleField::Genre => &self.genre,
            ArticleField::Image => &self.image,
            ArticleField::PublishDate => &self.publish_date,
            ArticleField::Body => &self.body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredArticle {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub record: ArticleRecord,
}

/// A scrape target and the storage partition its articles land in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub url: String,
    pub keyword: String,
    #[serde(default = "default_pages")]
    pub pages: u32,
    #[serde(default)]
    pub collection: Option<String>,
}

fn default_pages() -> u32 {
    1
}

impl Category {
    pub fn new(name: &str, url: &str, keyword: &str, pages: u32) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            keyword: keyword.to_string(),
            pages,
            collection: None,
        }
    }

    pub fn collection(&self) -> String {
        self.collection
            .clone()
            .unwrap_or_else(|| collection_for(&self.name))
    }
}

/// Name of the storage partition holding articles of `genre`.
pub fn collection_for(genre: &str) -> String {
    format!("{}_articles", genre)
}
