// Like/dislike membership sets - pure toggle rules, no I/O
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;
use crate::models::UserId;

/// Set of users who reacted to an entity. Order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionSet(BTreeSet<UserId>);

impl ReactionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.0.contains(user)
    }

    /// Returns true if the user was not already present
    pub fn insert(&mut self, user: UserId) -> bool {
        self.0.insert(user)
    }

    /// Returns true if the user was present
    pub fn remove(&mut self, user: &UserId) -> bool {
        self.0.remove(user)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserId> {
        self.0.iter()
    }
}

impl FromIterator<UserId> for ReactionSet {
    fn from_iter<I: IntoIterator<Item = UserId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Dislike,
}

impl ReactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            other => Err(CatalogError::Validation(format!(
                "Invalid reaction kind: {other}"
            ))),
        }
    }
}

/// Toggle `user` in `set`.
///
/// A user already in `set` is removed and `other` is returned untouched.
/// Otherwise the user joins `set` and leaves `other` in the same step, so a
/// user never ends up in both sets.
pub fn toggle(
    set: &ReactionSet,
    user: &UserId,
    other: &ReactionSet,
) -> (ReactionSet, ReactionSet) {
    let mut set = set.clone();
    let mut other = other.clone();

    if !set.remove(user) {
        set.insert(user.clone());
        other.remove(user);
    }

    (set, other)
}

/// Apply a like or dislike toggle to a likes/dislikes pair in place.
pub fn apply(
    likes: &mut ReactionSet,
    dislikes: &mut ReactionSet,
    user: &UserId,
    kind: ReactionKind,
) {
    let (new_likes, new_dislikes) = match kind {
        ReactionKind::Like => toggle(likes, user, dislikes),
        ReactionKind::Dislike => {
            let (d, l) = toggle(dislikes, user, likes);
            (l, d)
        }
    };
    *likes = new_likes;
    *dislikes = new_dislikes;
}

/// Which reaction, if any, the user currently holds on a likes/dislikes pair.
pub fn reaction_of(
    likes: &ReactionSet,
    dislikes: &ReactionSet,
    user: &UserId,
) -> Option<ReactionKind> {
    if likes.contains(user) {
        Some(ReactionKind::Like)
    } else if dislikes.contains(user) {
        Some(ReactionKind::Dislike)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id)
    }

    fn set(ids: &[&str]) -> ReactionSet {
        ids.iter().map(|id| user(id)).collect()
    }

    #[test]
    fn like_then_dislike_switches_sets() {
        let u = user("u");
        let mut likes = ReactionSet::new();
        let mut dislikes = ReactionSet::new();

        apply(&mut likes, &mut dislikes, &u, ReactionKind::Like);
        assert_eq!(likes, set(&["u"]));
        assert!(dislikes.is_empty());

        apply(&mut likes, &mut dislikes, &u, ReactionKind::Dislike);
        assert!(likes.is_empty());
        assert_eq!(dislikes, set(&["u"]));
    }

    #[test]
    fn toggling_twice_restores_the_original_pair() {
        let u = user("u");
        let starts = [
            (set(&[]), set(&[])),
            (set(&["u", "a"]), set(&["b"])),
            (set(&["a"]), set(&["b"])),
        ];

        for (likes, dislikes) in starts {
            let (l1, d1) = toggle(&likes, &u, &dislikes);
            let (l2, d2) = toggle(&l1, &u, &d1);
            assert_eq!((l2, d2), (likes, dislikes));
        }
    }

    #[test]
    fn liking_over_a_dislike_drops_the_dislike_for_good() {
        let u = user("u");
        let (l1, d1) = toggle(&set(&[]), &u, &set(&["u"]));
        assert_eq!((l1.clone(), d1.clone()), (set(&["u"]), set(&[])));

        let (l2, d2) = toggle(&l1, &u, &d1);
        assert!(l2.is_empty());
        assert!(d2.is_empty());
    }

    #[test]
    fn single_toggle_never_leaves_user_in_both_sets() {
        let u = user("u");
        let starts = [
            (set(&[]), set(&[])),
            (set(&["u"]), set(&[])),
            (set(&[]), set(&["u"])),
        ];

        for (likes, dislikes) in starts {
            for kind in [ReactionKind::Like, ReactionKind::Dislike] {
                let mut l = likes.clone();
                let mut d = dislikes.clone();
                apply(&mut l, &mut d, &u, kind);
                assert!(!(l.contains(&u) && d.contains(&u)));
            }
        }
    }

    #[test]
    fn un_react_leaves_other_set_alone() {
        let u = user("u");
        let likes = set(&["u", "a"]);
        let dislikes = set(&["b"]);

        let (l, d) = toggle(&likes, &u, &dislikes);
        assert_eq!(l, set(&["a"]));
        assert_eq!(d, dislikes);
    }

    #[test]
    fn other_users_are_untouched() {
        let mut likes = set(&["a"]);
        let mut dislikes = set(&["b"]);
        apply(&mut likes, &mut dislikes, &user("b"), ReactionKind::Like);
        assert_eq!(likes, set(&["a", "b"]));
        assert!(dislikes.is_empty());
    }

    #[test]
    fn reaction_of_reports_membership() {
        let likes = set(&["a"]);
        let dislikes = set(&["b"]);
        assert_eq!(reaction_of(&likes, &dislikes, &user("a")), Some(ReactionKind::Like));
        assert_eq!(reaction_of(&likes, &dislikes, &user("b")), Some(ReactionKind::Dislike));
        assert_eq!(reaction_of(&likes, &dislikes, &user("c")), None);
    }

    #[test]
    fn parses_reaction_kind() {
        assert_eq!("Like".parse::<ReactionKind>().unwrap(), ReactionKind::Like);
        assert_eq!(" dislike ".parse::<ReactionKind>().unwrap(), ReactionKind::Dislike);
        assert!(matches!(
            "heart".parse::<ReactionKind>(),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn serializes_as_plain_array() {
        let json = serde_json::to_string(&set(&["b", "a"])).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
    }
}
