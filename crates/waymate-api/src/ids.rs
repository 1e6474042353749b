use std::sync::atomic::{AtomicU64, Ordering};

/// Generates short human-legible correlation ids for trip requests and trips:
/// the uppercased first letters of each party's username followed by a
/// decimal stamp (`ALI1704103200000`, `ALIBOB1704103200001`).
///
/// The stamp starts from the millisecond wall clock but is forced to be
/// strictly increasing per process, so two requests landing in the same
/// millisecond still get distinct ids.
pub struct TagGenerator {
    last: AtomicU64,
}

impl TagGenerator {
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Id for a solo trip request: requester prefix + stamp.
    pub fn request_tag(&self, username: &str) -> String {
        format!("{}{}", prefix(username), self.next_stamp())
    }

    /// Id for a confirmed trip: requester prefix, companion prefix, stamp.
    pub fn trip_tag(&self, requester: &str, companion: &str) -> String {
        format!("{}{}{}", prefix(requester), prefix(companion), self.next_stamp())
    }

    fn next_stamp(&self) -> u64 {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// First three characters of the username, uppercased. Shorter names keep
/// whatever they have; no padding.
fn prefix(username: &str) -> String {
    username.chars().take(3).collect::<String>().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_tag_has_prefix_and_numeric_suffix() {
        let tags = TagGenerator::new();
        let tag = tags.request_tag("alice");
        assert!(tag.starts_with("ALI"));
        let suffix = &tag["ALI".len()..];
        assert!(!suffix.is_empty());
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn trip_tag_concatenates_both_prefixes_in_order() {
        let tags = TagGenerator::new();
        let tag = tags.trip_tag("alice", "bob");
        assert!(tag.starts_with("ALIBOB"));
    }

    #[test]
    fn short_usernames_use_what_they_have() {
        let tags = TagGenerator::new();
        assert!(tags.request_tag("al").starts_with("AL"));
        let tag = tags.trip_tag("al", "b");
        assert!(tag.starts_with("ALB"));
        assert!(tag["ALB".len()..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn stamps_strictly_increase_across_sequential_calls() {
        let tags = TagGenerator::new();
        let mut prev = 0u64;
        for _ in 0..100 {
            let tag = tags.request_tag("alice");
            let stamp: u64 = tag["ALI".len()..].parse().unwrap();
            assert!(stamp > prev, "stamp {} not greater than {}", stamp, prev);
            prev = stamp;
        }
    }

    #[test]
    fn concurrent_tags_never_collide() {
        let tags = std::sync::Arc::new(TagGenerator::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let tags = tags.clone();
            handles.push(std::thread::spawn(move || {
                (0..200).map(|_| tags.request_tag("alice")).collect::<Vec<_>>()
            }));
        }
        let mut all: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
    }
}
