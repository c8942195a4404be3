//! Presence and absence assertions on `expect(..)` chains.

use tl_lint_ts::{JsNode, NodeKind};

use super::names;
use super::Category;

/// Classifies the member expression directly on an `expect(..)` call.
///
/// `.not` modifiers are followed outward to the terminal matcher. An odd
/// number of them negates the matcher; an even number cancels out.
pub(crate) fn classify(node: JsNode<'_>) -> Category {
    if !node.is(NodeKind::MemberExpression) || !is_expect_call(node.field("object")) {
        return Category::None;
    }

    let mut current = node;
    let mut negations = 0usize;
    let matcher = loop {
        let Some(property) = current.field("property") else {
            return Category::None;
        };
        if property.text() != names::NOT {
            break property.text();
        }
        negations += 1;
        match current.parent() {
            Some(parent)
                if parent.is(NodeKind::MemberExpression)
                    && parent.field("object") == Some(current) =>
            {
                current = parent;
            }
            _ => return Category::None,
        }
    };

    let negated = negations % 2 == 1;
    let present = if names::PRESENCE_MATCHERS.contains(&matcher) {
        true
    } else if names::ABSENCE_MATCHERS.contains(&matcher) {
        false
    } else {
        return Category::None;
    };

    if present != negated {
        Category::PresenceAssert
    } else {
        Category::AbsenceAssert
    }
}

fn is_expect_call(node: Option<JsNode<'_>>) -> bool {
    node.filter(|n| n.is(NodeKind::CallExpression))
        .and_then(|call| call.field("function"))
        .is_some_and(|callee| callee.raw_kind() == "identifier" && callee.text() == names::EXPECT)
}
