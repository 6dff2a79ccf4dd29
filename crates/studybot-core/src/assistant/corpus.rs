//! Canned answers, keyed by topic.

use super::topic::TopicKey;
use crate::error::{Result, StudybotError};
use std::collections::HashMap;

const JAVASCRIPT: &[&str] = &[
    "A closure is a function bundled together with references to its surrounding state. Inner functions keep access to the variables of the scope they were created in, even after that outer function has returned.",
    "`let` and `const` are block scoped while `var` is function scoped. Prefer `const` by default and reach for `let` only when a binding must be reassigned.",
    "The event loop picks tasks from the queue whenever the call stack is empty. Promises schedule microtasks, which run before the next macrotask such as a timer callback.",
    "`==` compares after type coercion, `===` compares without it. Using strict equality avoids surprises like `0 == ''` evaluating to true.",
    "`async`/`await` is syntax over promises: an `async` function always returns a promise and `await` pauses it until the awaited promise settles.",
];

const PYTHON: &[&str] = &[
    "A list comprehension builds a list from an iterable in one expression, e.g. `[x * x for x in range(10) if x % 2 == 0]`.",
    "Decorators are callables that take a function and return a replacement. The `@name` syntax is shorthand for `func = name(func)`.",
    "Generators produce values lazily with `yield`, which keeps memory usage flat when iterating over large or infinite sequences.",
    "Mutable default arguments are evaluated once at definition time. Use `None` as the default and create the list or dict inside the function.",
];

const REACT: &[&str] = &[
    "Components re-render when their state or props change. Keep state as close as possible to where it is used to limit the re-render surface.",
    "`useEffect` runs after render. Return a cleanup function from it to cancel timers or subscriptions when the component unmounts or the dependencies change.",
    "Keys let React match list items between renders. Use stable identifiers rather than array indices when items can be reordered.",
    "Lifting state up means moving shared state to the closest common ancestor and passing it down through props.",
];

const CSS: &[&str] = &[
    "Flexbox lays items out along one axis; Grid handles two dimensions. Use Flexbox for toolbars and rows, Grid for page-level layouts.",
    "Specificity decides which rule wins: inline styles beat IDs, IDs beat classes, classes beat element selectors.",
    "The box model adds padding and border to the content width unless you set `box-sizing: border-box`.",
];

const SQL: &[&str] = &[
    "An INNER JOIN returns rows with matches on both sides; a LEFT JOIN keeps every row from the left table and fills missing matches with NULL.",
    "Indexes speed up lookups at the cost of slower writes. Index the columns you filter and join on most often.",
    "`GROUP BY` collapses rows into groups and `HAVING` filters those groups, while `WHERE` filters rows before grouping.",
    "Transactions group statements so they either all succeed or all fail, keeping the database consistent.",
];

const RUST: &[&str] = &[
    "Ownership means every value has exactly one owner; when the owner goes out of scope the value is dropped.",
    "Borrowing lets you reference a value without taking ownership. You can have many shared references or one mutable reference at a time.",
    "`Result<T, E>` models recoverable errors and the `?` operator propagates them to the caller.",
    "Traits describe shared behaviour; generics bounded by traits are monomorphized, while `dyn Trait` uses dynamic dispatch.",
];

const DEFAULT: &[&str] = &[
    "Great question! Break the problem into smaller pieces and try each one in isolation before putting them together.",
    "A good way to learn this is to write a tiny example, run it, and change one thing at a time to see what happens.",
    "Check the topic library for a step-by-step guide, then try the quiz at the end to test your understanding.",
    "I'd start with the fundamentals section of the related topic; most advanced questions build on those ideas.",
];

/// Static mapping from topic key to an ordered, non-empty list of answers.
///
/// Built once and shared read-only; lookups never fail.
#[derive(Debug, Clone)]
pub struct ResponseCorpus {
    topics: HashMap<String, Vec<String>>,
    default: Vec<String>,
}

impl Default for ResponseCorpus {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ResponseCorpus {
    /// The corpus shipped with the engine.
    pub fn builtin() -> Self {
        let topics = [
            ("javascript", JAVASCRIPT),
            ("python", PYTHON),
            ("react", REACT),
            ("css", CSS),
            ("sql", SQL),
            ("rust", RUST),
        ]
        .into_iter()
        .map(|(key, answers)| (key.to_string(), owned_list(answers)))
        .collect();

        Self {
            topics,
            default: owned_list(DEFAULT),
        }
    }

    /// Builds a corpus from caller-supplied lists.
    ///
    /// # Errors
    ///
    /// Returns a config error if the default list or any topic list is empty,
    /// or if two keys differ only by case.
    pub fn from_entries(
        topics: impl IntoIterator<Item = (String, Vec<String>)>,
        default: Vec<String>,
    ) -> Result<Self> {
        if default.is_empty() {
            return Err(StudybotError::config("default answer list must not be empty"));
        }
        let mut map = HashMap::new();
        for (key, answers) in topics {
            if answers.is_empty() {
                return Err(StudybotError::config(format!(
                    "answer list for topic '{}' must not be empty",
                    key
                )));
            }
            let normalized = key.to_lowercase();
            if map.contains_key(&normalized) {
                return Err(StudybotError::config(format!(
                    "duplicate answer list for topic '{}'",
                    key
                )));
            }
            map.insert(normalized, answers);
        }
        Ok(Self {
            topics: map,
            default,
        })
    }

    /// Answers for `topic`, or the default list when the topic is unknown.
    pub fn lookup(&self, topic: &TopicKey) -> &[String] {
        match topic {
            TopicKey::Known(key) => self.topics.get(key).unwrap_or(&self.default),
            TopicKey::None => &self.default,
        }
    }

    /// Topic keys with a dedicated list, sorted.
    pub fn topic_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.topics.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

fn owned_list(answers: &[&str]) -> Vec<String> {
    answers.iter().map(|a| a.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::topic::KNOWN_TOPICS;

    #[test]
    fn test_builtin_covers_known_topics() {
        let corpus = ResponseCorpus::builtin();
        for key in KNOWN_TOPICS {
            let answers = corpus.lookup(&TopicKey::known(key));
            assert!(!answers.is_empty(), "no answers for {}", key);
            assert_ne!(answers, corpus.lookup(&TopicKey::None));
        }
    }

    #[test]
    fn test_unknown_topic_uses_default() {
        let corpus = ResponseCorpus::builtin();
        assert_eq!(
            corpus.lookup(&TopicKey::known("haskell")),
            corpus.lookup(&TopicKey::None)
        );
        assert_eq!(corpus.lookup(&TopicKey::None).len(), DEFAULT.len());
    }

    #[test]
    fn test_from_entries_rejects_empty_lists() {
        let err = ResponseCorpus::from_entries(Vec::new(), Vec::new()).unwrap_err();
        assert!(err.is_config());

        let err = ResponseCorpus::from_entries(
            vec![("go".to_string(), Vec::new())],
            vec!["fallback".to_string()],
        )
        .unwrap_err();
        assert!(err.to_string().contains("'go'"));
    }

    #[test]
    fn test_from_entries_lowercases_keys() {
        let corpus = ResponseCorpus::from_entries(
            vec![("Go".to_string(), vec!["goroutines".to_string()])],
            vec!["fallback".to_string()],
        )
        .unwrap();
        assert_eq!(corpus.lookup(&TopicKey::known("go")), ["goroutines".to_string()]);
        assert_eq!(corpus.topic_keys(), vec!["go"]);
    }

    #[test]
    fn test_from_entries_rejects_case_duplicates() {
        let err = ResponseCorpus::from_entries(
            vec![
                ("go".to_string(), vec!["channels".to_string()]),
                ("Go".to_string(), vec!["goroutines".to_string()]),
            ],
            vec!["fallback".to_string()],
        )
        .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("duplicate"));
    }
}
