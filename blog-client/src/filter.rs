//! Клиентская фильтрация и производные данные для списка постов.

use crate::models::Post;

/// Длина превью в символах.
pub const EXCERPT_CHARS: usize = 150;
/// Скорость чтения, символов в минуту.
pub const CHARS_PER_MINUTE: usize = 200;
/// Сколько похожих постов показывать по умолчанию.
pub const DEFAULT_RELATED_LIMIT: usize = 2;

/// Подстрока `query` встречается в заголовке или тексте (без учёта регистра).
///
/// Пустой запрос подходит любому посту.
pub fn matches_search(post: &Post, query: &str) -> bool {
    let query = query.to_lowercase();
    post.title.to_lowercase().contains(&query) || post.content.to_lowercase().contains(&query)
}

/// У поста есть тег, совпадающий с `tag` без учёта регистра.
pub fn has_tag(post: &Post, tag: &str) -> bool {
    let tag = tag.to_lowercase();
    post.tags.iter().any(|t| t.to_lowercase() == tag)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Комбинированный фильтр: поиск и тег должны совпасть одновременно.
pub struct PostFilter {
    /// Поисковая строка.
    pub search: Option<String>,
    /// Тег (категория).
    pub tag: Option<String>,
}

impl PostFilter {
    /// Проверяет один пост.
    pub fn matches(&self, post: &Post) -> bool {
        let search_ok = self
            .search
            .as_deref()
            .is_none_or(|query| matches_search(post, query));
        let tag_ok = self.tag.as_deref().is_none_or(|tag| has_tag(post, tag));
        search_ok && tag_ok
    }

    /// Оставляет подходящие посты, сохраняя порядок.
    pub fn apply<'a>(&self, posts: &'a [Post]) -> Vec<&'a Post> {
        posts.iter().filter(|post| self.matches(post)).collect()
    }
}

/// Все теги в порядке первого появления, без повторов.
pub fn all_tags(posts: &[Post]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in posts.iter().flat_map(|post| &post.tags) {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags
}

/// Число постов на каждый тег, по убыванию; при равенстве сохраняется порядок `all_tags`.
pub fn tag_counts(posts: &[Post]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = all_tags(posts)
        .into_iter()
        .map(|tag| {
            let count = posts.iter().filter(|post| post.tags.contains(&tag)).count();
            (tag, count)
        })
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Посты с хотя бы одним общим тегом, кроме самого `post`.
pub fn related_posts<'a>(post: &Post, posts: &'a [Post], limit: usize) -> Vec<&'a Post> {
    posts
        .iter()
        .filter(|other| other.id != post.id)
        .filter(|other| other.tags.iter().any(|tag| post.tags.contains(tag)))
        .take(limit)
        .collect()
}

/// Первые 150 символов с многоточием, либо текст целиком.
pub fn excerpt(content: &str) -> String {
    match content.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Время чтения в минутах, округлённое вверх.
pub fn reading_time_minutes(content: &str) -> usize {
    content.chars().count().div_ceil(CHARS_PER_MINUTE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post(id: i64, title: &str, content: &str, tags: &[&str]) -> Post {
        Post {
            id,
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: Utc.timestamp_opt(id, 0).single().expect("valid ts"),
        }
    }

    fn sample() -> Vec<Post> {
        vec![
            post(3, "Rust async", "Tokio runtime", &["rust", "async"]),
            post(2, "Styling", "CSS grid tricks", &["css"]),
            post(1, "Ownership", "borrow checker in RUST", &["Rust"]),
        ]
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_content() {
        let posts = sample();
        let filter = PostFilter {
            search: Some("rust".to_string()),
            tag: None,
        };
        let ids: Vec<_> = filter.apply(&posts).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn empty_search_matches_everything() {
        let posts = sample();
        assert!(posts.iter().all(|p| matches_search(p, "")));
    }

    #[test]
    fn tag_filter_ignores_case_but_needs_exact_tag() {
        let posts = sample();
        let filter = PostFilter {
            search: None,
            tag: Some("RUST".to_string()),
        };
        let ids: Vec<_> = filter.apply(&posts).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert!(!has_tag(&posts[0], "rus"));
    }

    #[test]
    fn search_and_tag_are_combined() {
        let posts = sample();
        let filter = PostFilter {
            search: Some("borrow".to_string()),
            tag: Some("rust".to_string()),
        };
        let ids: Vec<_> = filter.apply(&posts).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn all_tags_keeps_first_seen_order() {
        let mut posts = sample();
        posts.push(post(0, "again", "", &["css", "rust"]));
        assert_eq!(all_tags(&posts), vec!["rust", "async", "css", "Rust"]);
    }

    #[test]
    fn tag_counts_sorted_by_count_then_first_seen() {
        let mut posts = sample();
        posts.push(post(0, "again", "", &["css", "rust"]));
        let counts = tag_counts(&posts);
        assert_eq!(
            counts,
            vec![
                ("rust".to_string(), 2),
                ("css".to_string(), 2),
                ("async".to_string(), 1),
                ("Rust".to_string(), 1),
            ]
        );
    }

    #[test]
    fn related_posts_share_a_tag_and_exclude_self() {
        let posts = vec![
            post(1, "a", "", &["x", "y"]),
            post(2, "b", "", &["y"]),
            post(3, "c", "", &["z"]),
            post(4, "d", "", &["x"]),
            post(5, "e", "", &["x"]),
        ];
        let related = related_posts(&posts[0], &posts, DEFAULT_RELATED_LIMIT);
        let ids: Vec<_> = related.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 4]);

        assert!(related_posts(&posts[2], &posts, 5).is_empty());
    }

    #[test]
    fn excerpt_truncates_long_content() {
        let long = "a".repeat(151);
        let short = "b".repeat(150);
        assert_eq!(excerpt(&long), format!("{}...", "a".repeat(150)));
        assert_eq!(excerpt(&short), short);
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let cyrillic = "я".repeat(160);
        let cut = excerpt(&cyrillic);
        assert_eq!(cut.chars().count(), 153);
    }

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_time_minutes(""), 0);
        assert_eq!(reading_time_minutes(&"a".repeat(200)), 1);
        assert_eq!(reading_time_minutes(&"a".repeat(201)), 2);
    }
}
