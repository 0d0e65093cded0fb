use serde::{Deserialize, Serialize};
use std::fmt;

/// Visibility of a custom list. The service accepts exactly these three
/// values; `private` is the most restrictive and the default for new lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListPrivacy {
    #[default]
    Private,
    Friends,
    Public,
}

impl ListPrivacy {
    pub fn as_str(self) -> &'static str {
        match self {
            ListPrivacy::Private => "private",
            ListPrivacy::Friends => "friends",
            ListPrivacy::Public => "public",
        }
    }
}

impl fmt::Display for ListPrivacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the list enumeration call.
#[derive(Debug, Clone, Deserialize)]
pub struct ListSummary {
    pub name: String,
    pub slug: String,
    pub privacy: ListPrivacy,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Images {
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub fanart: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ratings {
    #[serde(default)]
    pub percentage: f32,
    #[serde(default)]
    pub votes: u32,
}

/// A movie as the service describes it. The client passes these fields
/// through untouched; only the identifiers matter for building requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Movie {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub tmdb_id: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub certification: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Images,
    #[serde(default)]
    pub ratings: Ratings,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
}

/// One entry of a list's contents. Lists can hold non-movie items; those
/// carry no `movie` payload and are skipped by the menu layer.
#[derive(Debug, Clone, Deserialize)]
pub struct ListItem {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub movie: Option<Movie>,
    #[serde(default)]
    pub plays: u32,
}

/// Response of the single-list read.
#[derive(Debug, Clone, Deserialize)]
pub struct ListItems {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub items: Vec<ListItem>,
}

/// Outcome of a mutation call. The service reports success through a
/// `status` field; anything else counts as failure, without finer-grained
/// partial-failure semantics.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResult {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiResult {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}
