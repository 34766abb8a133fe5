//! Error context: the path of labels leading to the node being compiled

use std::fmt;
use std::rc::Rc;

#[derive(Debug)]
struct Frame {
    label: String,
    parent: Option<Rc<Frame>>,
}

/// Immutable stack of context labels
///
/// `push` returns a new context sharing its tail with the original, so a
/// context can be handed down a recursive traversal without ever being popped.
/// Field names and combinator labels such as `AND[0]` are the usual entries.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    head: Option<Rc<Frame>>,
    depth: usize,
}

impl ErrorContext {
    /// Empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with one more label on top
    pub fn push(&self, label: impl Into<String>) -> Self {
        Self {
            head: Some(Rc::new(Frame {
                label: label.into(),
                parent: self.head.clone(),
            })),
            depth: self.depth + 1,
        }
    }

    /// Number of labels
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether no label has been pushed
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Labels from root to leaf
    pub fn snapshot(&self) -> Vec<String> {
        let mut labels = Vec::with_capacity(self.depth);
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            labels.push(current.label.clone());
            frame = current.parent.as_deref();
        }
        labels.reverse();
        labels
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.snapshot().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_root_to_leaf() {
        let context = ErrorContext::new().push("AND[1]").push("orders").push("amount");
        assert_eq!(context.snapshot(), vec!["AND[1]", "orders", "amount"]);
        assert_eq!(context.depth(), 3);
        assert_eq!(context.to_string(), "[AND[1], orders, amount]");
    }

    #[test]
    fn test_push_leaves_original_untouched() {
        let parent = ErrorContext::new().push("OR[0]");
        let left = parent.push("name");
        let right = parent.push("age");

        assert_eq!(parent.snapshot(), vec!["OR[0]"]);
        assert_eq!(left.snapshot(), vec!["OR[0]", "name"]);
        assert_eq!(right.snapshot(), vec!["OR[0]", "age"]);
        assert!(ErrorContext::new().is_empty());
    }
}
