use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engagement::reactions::ReactionSet;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Opaque outfit identifier assigned by the catalog API
    OutfitId
);
string_id!(
    /// Comment identifier, unique within its outfit
    CommentId
);
string_id!(
    /// Reply identifier, unique within its comment
    ReplyId
);
string_id!(
    /// Identifier of a signed-in user
    UserId
);

/// A catalog entry as returned by the catalog API.
///
/// The `number_of_*` counters are maintained by the server. They are
/// displayed as-is and never recomputed locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outfit {
    #[serde(rename = "_id", alias = "id")]
    pub id: OutfitId,
    pub category: String,
    pub section: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub number_of_items: usize,
    #[serde(default)]
    pub number_of_likes: usize,
    #[serde(default)]
    pub number_of_comments: usize,
    #[serde(default)]
    pub likes: ReactionSet,
    #[serde(default)]
    pub dislikes: ReactionSet,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub source_name: String,
    pub item_name: String,
    pub item_price: f64,
    pub item_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id", alias = "id")]
    pub id: CommentId,
    pub author_id: UserId,
    #[serde(default)]
    pub author_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: ReactionSet,
    #[serde(default)]
    pub dislikes: ReactionSet,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(rename = "_id", alias = "id")]
    pub id: ReplyId,
    pub author_id: UserId,
    #[serde(default)]
    pub author_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: ReactionSet,
    #[serde(default)]
    pub dislikes: ReactionSet,
}

/// A server-maintained counter that disagrees with the collection it mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterDiscrepancy {
    pub counter: &'static str,
    pub reported: usize,
    pub actual: usize,
}

impl fmt::Display for CounterDiscrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} reports {} but the document holds {}",
            self.counter, self.reported, self.actual
        )
    }
}

impl Outfit {
    /// Minimal outfit with empty engagement, mostly for seeding and fixtures.
    pub fn new(
        id: impl Into<OutfitId>,
        category: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            section: section.into(),
            kind: String::new(),
            description: None,
            tags: Vec::new(),
            items: Vec::new(),
            rating: 0.0,
            active: true,
            image: None,
            created_at: Utc::now(),
            number_of_items: 0,
            number_of_likes: 0,
            number_of_comments: 0,
            likes: ReactionSet::default(),
            dislikes: ReactionSet::default(),
            comments: Vec::new(),
        }
    }

    pub fn comment(&self, id: &CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| &c.id == id)
    }

    /// Compare the denormalized counters with what the document actually holds.
    /// Only reports; the counters stay exactly as the server sent them.
    pub fn counter_discrepancies(&self) -> Vec<CounterDiscrepancy> {
        let checks = [
            ("numberOfItems", self.number_of_items, self.items.len()),
            ("numberOfLikes", self.number_of_likes, self.likes.len()),
            (
                "numberOfComments",
                self.number_of_comments,
                self.comments.len(),
            ),
        ];

        checks
            .into_iter()
            .filter(|(_, reported, actual)| reported != actual)
            .map(|(counter, reported, actual)| CounterDiscrepancy {
                counter,
                reported,
                actual,
            })
            .collect()
    }
}

impl Comment {
    pub fn reply(&self, id: &ReplyId) -> Option<&Reply> {
        self.replies.iter().find(|r| &r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_document_with_underscore_ids() {
        let json = r#"{
            "_id": "o1",
            "category": "Casual",
            "section": "Men",
            "type": "summer",
            "description": "Linen shirt and shorts",
            "tags": ["linen"],
            "items": [{
                "sourceName": "Shop",
                "itemName": "Shirt",
                "itemPrice": 29.5,
                "itemLink": "https://shop.example/shirt"
            }],
            "rating": 4.5,
            "active": true,
            "createdAt": "2025-01-15T12:00:00Z",
            "numberOfItems": 1,
            "numberOfLikes": 1,
            "numberOfComments": 1,
            "likes": ["u1"],
            "dislikes": [],
            "comments": [{
                "_id": "c1",
                "authorId": "u2",
                "authorName": "Bea",
                "text": "Nice",
                "createdAt": "2025-01-15T12:05:00Z",
                "likes": [],
                "dislikes": ["u1"],
                "replies": [{
                    "id": "r1",
                    "authorId": "u1",
                    "text": "Thanks",
                    "createdAt": "2025-01-15T12:06:00Z"
                }]
            }]
        }"#;

        let outfit: Outfit = serde_json::from_str(json).unwrap();
        assert_eq!(outfit.id, OutfitId::new("o1"));
        assert_eq!(outfit.kind, "summer");
        assert_eq!(outfit.items[0].item_price, 29.5);
        assert!(outfit.likes.contains(&UserId::new("u1")));

        let comment = outfit.comment(&CommentId::new("c1")).unwrap();
        assert_eq!(comment.author_name, "Bea");
        assert!(comment.dislikes.contains(&UserId::new("u1")));
        let reply = comment.reply(&ReplyId::new("r1")).unwrap();
        assert_eq!(reply.text, "Thanks");
        assert!(reply.likes.is_empty());

        assert!(outfit.counter_discrepancies().is_empty());
    }

    #[test]
    fn serializes_id_as_underscore_id() {
        let outfit = Outfit::new("o9", "Formal", "Women");
        let value = serde_json::to_value(&outfit).unwrap();
        assert_eq!(value["_id"], "o9");
        assert_eq!(value["numberOfComments"], 0);
    }

    #[test]
    fn counter_discrepancies_are_reported_not_fixed() {
        let mut outfit = Outfit::new("o1", "Casual", "Men");
        outfit.number_of_likes = 3;
        outfit.likes.insert(UserId::new("u1"));

        let found = outfit.counter_discrepancies();
        assert_eq!(
            found,
            vec![CounterDiscrepancy {
                counter: "numberOfLikes",
                reported: 3,
                actual: 1,
            }]
        );
        assert_eq!(outfit.number_of_likes, 3);
    }
}
