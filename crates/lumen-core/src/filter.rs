//! List filtering and ordering.
//!
//! A [`Filter`] owns an ordered collection of items, a text query and a
//! comparator. With an empty query every item is shown, ordered by the
//! comparator; otherwise only items the scorer matches are shown, best score
//! first. Sorting is stable, so items the comparator considers equal keep
//! their insertion order. Items are addressed by position: duplicates are
//! never merged or dropped.

use std::cmp::Ordering;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Something a [`Filter`] can hold.
pub trait FilterItem {
    /// Stable identifier, used as the history key.
    fn id(&self) -> &str;

    /// Text the query is matched against.
    fn filter_text(&self) -> String;
}

/// Scores `text` against a non-empty `query`; `None` means no match.
pub trait Scorer: Send + Sync {
    fn score(&self, text: &str, query: &str) -> Option<i64>;
}

/// Default scorer backed by the skim fuzzy matching algorithm.
#[derive(Default)]
pub struct SkimScorer {
    matcher: SkimMatcherV2,
}

impl Scorer for SkimScorer {
    fn score(&self, text: &str, query: &str) -> Option<i64> {
        self.matcher.fuzzy_match(text, query)
    }
}

/// Orders two items; `Less` puts the first one earlier.
pub type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Comparator keeping insertion order.
pub fn insertion_order<T>() -> Comparator<T> {
    Box::new(|_, _| Ordering::Equal)
}

/// Comparator ranking by descending last-run timestamp. `last_run` returns 0
/// for items that never ran.
pub fn most_recent_first<T, F>(last_run: F) -> Comparator<T>
where
    T: FilterItem,
    F: Fn(&str) -> i64 + Send + Sync + 'static,
{
    Box::new(move |a: &T, b: &T| last_run(b.id()).cmp(&last_run(a.id())))
}

/// Filterable, sortable item collection.
pub struct Filter<T> {
    items: Vec<T>,
    query: String,
    comparator: Comparator<T>,
    scorer: Box<dyn Scorer>,
    /// Positions into `items`, in display order.
    visible: Vec<usize>,
}

impl<T: FilterItem> Filter<T> {
    pub fn new(items: Vec<T>) -> Self {
        let mut filter = Self {
            items,
            query: String::new(),
            comparator: insertion_order(),
            scorer: Box::<SkimScorer>::default(),
            visible: Vec::new(),
        };
        filter.refresh();
        filter
    }

    pub fn with_comparator(mut self, comparator: Comparator<T>) -> Self {
        self.comparator = comparator;
        self.refresh();
        self
    }

    pub fn with_scorer(mut self, scorer: Box<dyn Scorer>) -> Self {
        self.scorer = scorer;
        self.refresh();
        self
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.refresh();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refresh();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Recompute the visible items, e.g. after the comparator's inputs
    /// changed.
    pub fn refresh(&mut self) {
        let query = self.query.trim();

        if query.is_empty() {
            let mut visible: Vec<usize> = (0..self.items.len()).collect();
            visible.sort_by(|&a, &b| (self.comparator)(&self.items[a], &self.items[b]));
            self.visible = visible;
            return;
        }

        let mut scored: Vec<(usize, i64)> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                self.scorer
                    .score(&item.filter_text(), query)
                    .map(|score| (index, score))
            })
            .collect();
        scored.sort_by(|&(a, score_a), &(b, score_b)| {
            score_b
                .cmp(&score_a)
                .then_with(|| (self.comparator)(&self.items[a], &self.items[b]))
        });
        self.visible = scored.into_iter().map(|(index, _)| index).collect();
    }

    /// Visible item at display position `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.visible.get(index).map(|&i| &self.items[i])
    }

    pub fn visible(&self) -> impl Iterator<Item = &T> {
        self.visible.iter().map(|&i| &self.items[i])
    }

    /// Number of visible items.
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// All items in insertion order.
    pub fn items(&self) -> &[T] {
        &self.items
    }
}
