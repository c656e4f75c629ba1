//! Nested explanation chains attached to a diagnostic.

use serde::{Deserialize, Serialize};

/// A line of explanation with optional nested detail lines.
///
/// Rendered below the diagnostic headline, each nesting level indented by
/// two more spaces:
///
/// ```text
/// error TS6059: File '/p/types/type.ts' is not under 'rootDir' '/p/src'. ...
///   The file is in the program because:
///     Matched by default include pattern '**/*'
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageChain {
    /// The text of this line.
    pub text: String,
    /// Detail lines nested one level deeper.
    pub children: Vec<MessageChain>,
}

impl MessageChain {
    /// Creates a chain node without children.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Appends a nested detail line.
    pub fn with_child(mut self, child: MessageChain) -> Self {
        self.children.push(child);
        self
    }

    /// Returns every line of the chain with its nesting depth, depth-first.
    pub fn flatten(&self) -> Vec<(usize, &str)> {
        let mut out = Vec::new();
        self.collect(0, &mut out);
        out
    }

    fn collect<'a>(&'a self, depth: usize, out: &mut Vec<(usize, &'a str)>) {
        out.push((depth, self.text.as_str()));
        for child in &self.children {
            child.collect(depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_depth_first() {
        let chain = MessageChain::new("The file is in the program because:")
            .with_child(MessageChain::new("Matched by default include pattern '**/*'"))
            .with_child(MessageChain::new("Imported via './a'"));
        assert_eq!(
            chain.flatten(),
            vec![
                (0, "The file is in the program because:"),
                (1, "Matched by default include pattern '**/*'"),
                (1, "Imported via './a'"),
            ]
        );
    }

    #[test]
    fn leaf_has_no_children() {
        let chain = MessageChain::new("leaf");
        assert!(chain.children.is_empty());
        assert_eq!(chain.flatten().len(), 1);
    }
}
