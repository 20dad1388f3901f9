//! Immutable, ordered index over one search's matches

use crate::types::RawMatch;
use once_cell::sync::Lazy;
use regex::Regex;

/// A single run of digits inside parentheses, e.g. "guest (1234).jpg".
static PAREN_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d+)\)").unwrap());

/// One matched photograph, with its derived display key and sort token.
#[derive(Clone)]
pub struct PhotoMatch {
    /// Relative-path-shaped identifier used against the asset service.
    pub key: String,
    pub similarity: f32,
    /// Numeric token extracted from the filename; 0 when absent.
    pub sort_token: u32,
}

impl PhotoMatch {
    /// The parenthesised photo number for display, when the filename has one.
    pub fn display_number(&self) -> Option<u32> {
        if self.sort_token > 0 {
            Some(self.sort_token)
        } else {
            None
        }
    }

    pub fn file_name(&self) -> &str {
        self.key
            .rsplit(['\\', '/'])
            .next()
            .unwrap_or(self.key.as_str())
    }
}

/// Ordered result set for one search session. Built once per search
/// response and never mutated; a new search builds a new one.
pub struct ResultSet {
    items: Vec<PhotoMatch>,
}

/// Extract the portion of a server path after the photos root. Malformed
/// paths fall back to the full path string.
fn relative_key(path: &str) -> String {
    path.split_once("photos\\")
        .or_else(|| path.split_once("photos/"))
        .map(|(_, rest)| rest.to_string())
        .unwrap_or_else(|| path.to_string())
}

fn sort_token(key: &str) -> u32 {
    let file_name = key.rsplit(['\\', '/']).next().unwrap_or(key);
    PAREN_NUMBER
        .captures(file_name)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0)
}

impl ResultSet {
    /// Index the server's matches: derive keys, extract sort tokens and
    /// order ascending by token. Equal tokens keep server order.
    pub fn build(raw: Vec<RawMatch>) -> Self {
        let mut items: Vec<PhotoMatch> = raw
            .into_iter()
            .map(|m| {
                let key = relative_key(&m.image_path);
                let token = sort_token(&key);
                PhotoMatch {
                    key,
                    similarity: m.similarity,
                    sort_token: token,
                }
            })
            .collect();
        items.sort_by_key(|m| m.sort_token);
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PhotoMatch> {
        self.items.get(index)
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.items.iter().position(|m| m.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhotoMatch> {
        self.items.iter()
    }

    /// Keys from `start` onwards, up to `count` entries, for prefetch batches.
    pub fn keys_from(&self, start: usize, count: usize) -> Vec<String> {
        self.items
            .iter()
            .skip(start)
            .take(count)
            .map(|m| m.key.clone())
            .collect()
    }

    /// Keys within `radius` of `index` on both sides, excluding `index`
    /// itself, for modal locality prefetch.
    pub fn adjacent_keys(&self, index: usize, radius: usize) -> Vec<String> {
        let mut keys = Vec::with_capacity(radius * 2);
        for step in 1..=radius {
            if let Some(m) = self.items.get(index + step) {
                keys.push(m.key.clone());
            }
            if let Some(i) = index.checked_sub(step) {
                if let Some(m) = self.items.get(i) {
                    keys.push(m.key.clone());
                }
            }
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(path: &str, similarity: f32) -> RawMatch {
        RawMatch {
            image_path: path.to_string(),
            similarity,
        }
    }

    #[test]
    fn keys_are_relative_to_photos_root() {
        let set = ResultSet::build(vec![
            raw(r"D:\wedding\photos\hall\guest (12).jpg", 0.9),
            raw("/srv/photos/garden/guest (3).jpg", 0.8),
        ]);
        assert_eq!(set.get(0).unwrap().key, "garden/guest (3).jpg");
        assert_eq!(set.get(1).unwrap().key, r"hall\guest (12).jpg");
    }

    #[test]
    fn malformed_path_falls_back_to_full_string() {
        let set = ResultSet::build(vec![raw("no-root-here (7).jpg", 0.5)]);
        assert_eq!(set.get(0).unwrap().key, "no-root-here (7).jpg");
        assert_eq!(set.get(0).unwrap().sort_token, 7);
    }

    #[test]
    fn sorted_ascending_by_token() {
        let set = ResultSet::build(vec![
            raw(r"x\photos\a (30).jpg", 0.9),
            raw(r"x\photos\a (2).jpg", 0.8),
            raw(r"x\photos\a (100).jpg", 0.7),
        ]);
        let tokens: Vec<u32> = set.iter().map(|m| m.sort_token).collect();
        assert_eq!(tokens, vec![2, 30, 100]);
        for i in 0..set.len() - 1 {
            assert!(set.get(i).unwrap().sort_token <= set.get(i + 1).unwrap().sort_token);
        }
    }

    #[test]
    fn missing_token_sorts_first_and_keeps_server_order() {
        let set = ResultSet::build(vec![
            raw(r"x\photos\b.jpg", 0.9),
            raw(r"x\photos\a.jpg", 0.8),
            raw(r"x\photos\c (1).jpg", 0.7),
        ]);
        // Both tokenless entries have token 0 and stay in server order.
        assert_eq!(set.get(0).unwrap().key, r"b.jpg");
        assert_eq!(set.get(1).unwrap().key, r"a.jpg");
        assert_eq!(set.get(2).unwrap().sort_token, 1);
        assert!(set.get(0).unwrap().display_number().is_none());
    }

    #[test]
    fn index_of_finds_keys() {
        let set = ResultSet::build(vec![
            raw(r"x\photos\a (1).jpg", 0.9),
            raw(r"x\photos\a (2).jpg", 0.8),
        ]);
        assert_eq!(set.index_of(r"a (2).jpg"), Some(1));
        assert_eq!(set.index_of("missing"), None);
    }

    #[test]
    fn adjacent_keys_clip_at_bounds() {
        let set = ResultSet::build(
            (1..=5)
                .map(|i| raw(&format!(r"x\photos\a ({}).jpg", i), 0.9))
                .collect(),
        );
        let keys = set.adjacent_keys(0, 2);
        assert_eq!(keys, vec![r"a (2).jpg".to_string(), r"a (3).jpg".to_string()]);
        let keys = set.adjacent_keys(4, 2);
        assert_eq!(keys, vec![r"a (4).jpg".to_string(), r"a (3).jpg".to_string()]);
    }
}
