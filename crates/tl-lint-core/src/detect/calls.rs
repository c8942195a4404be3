//! Classification of identifiers in call position.
//!
//! An identifier is resolved against the alias table, then tried against
//! each [`CallCheck`] in [`CallCheck::PRECEDENCE`] order; the first match
//! decides its [`Category`].

use std::collections::BTreeSet;

use tl_lint_ts::{JsNode, NodeKind};

use super::names;
use super::{BindingKind, Category, Helpers};

/// Where a resolved identifier comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Bound by a testing-library, user-event or custom module import.
    Family,
    /// Last bound by an unrelated import.
    Foreign,
    /// Not bound by any import.
    Unbound,
}

/// An identifier resolved against the alias table.
#[derive(Debug, Clone, Copy)]
struct Resolved<'a> {
    local: &'a str,
    canonical: Option<&'a str>,
    origin: Origin,
}

impl Resolved<'_> {
    fn is_named(&self, name: &str) -> bool {
        self.local == name || self.canonical == Some(name)
    }

    /// Entry of `list` this identifier is known by, canonical name first.
    fn named_in(&self, list: &[&'static str]) -> Option<&'static str> {
        list.iter()
            .find(|n| self.canonical == Some(**n))
            .or_else(|| list.iter().find(|n| self.local == **n))
            .copied()
    }

    fn named_in_set(&self, set: &BTreeSet<String>) -> bool {
        set.contains(self.local) || self.canonical.is_some_and(|c| set.contains(c))
    }

    fn has_prefix(&self, prefixes: &[&str]) -> bool {
        names::has_prefix(self.local, prefixes)
            || self.canonical.is_some_and(|c| names::has_prefix(c, prefixes))
    }
}

/// One step of call classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallCheck {
    /// `render` and configured render wrappers.
    Render,
    /// `waitFor` and friends.
    AsyncUtil,
    /// `userEvent.<method>`.
    UserEventMethod,
    /// Configured custom queries.
    CustomQuery,
    /// `getBy*`, `getAllBy*`
    GetQueryVariant,
    /// `queryBy*`, `queryAllBy*`
    QueryQueryVariant,
    /// `findBy*`, `findAllBy*`
    FindQueryVariant,
}

impl CallCheck {
    /// Order in which checks run. The first match wins.
    pub const PRECEDENCE: [Self; 7] = [
        Self::Render,
        Self::AsyncUtil,
        Self::UserEventMethod,
        Self::CustomQuery,
        Self::GetQueryVariant,
        Self::QueryQueryVariant,
        Self::FindQueryVariant,
    ];

    fn check(self, node: JsNode<'_>, r: &Resolved<'_>, h: &Helpers<'_, '_>) -> Option<Category> {
        let settings = h.settings;
        match self {
            Self::Render => {
                let by_name = if settings.aggressive_render_reporting {
                    r.local.to_lowercase().contains(names::RENDER_NAME)
                        || r.canonical == Some(names::RENDER_NAME)
                } else {
                    r.is_named(names::RENDER_NAME)
                        || settings.custom_renders.iter().any(|n| r.is_named(n))
                };
                (by_name && is_potential(r, h)).then_some(Category::Render)
            }
            Self::AsyncUtil => r
                .named_in(names::ASYNC_UTILS)
                .filter(|_| is_potential(r, h))
                .map(Category::AsyncUtil),
            Self::UserEventMethod => {
                is_user_event_method(node, h).then_some(Category::UserEventMethod)
            }
            Self::CustomQuery => r
                .named_in_set(&settings.custom_queries)
                .then_some(Category::CustomQuery),
            Self::GetQueryVariant => r
                .has_prefix(&["getBy", "getAllBy"])
                .then_some(Category::GetQueryVariant),
            Self::QueryQueryVariant => r
                .has_prefix(&["queryBy", "queryAllBy"])
                .then_some(Category::QueryQueryVariant),
            Self::FindQueryVariant => r
                .has_prefix(names::ASYNC_QUERY_PREFIXES)
                .then_some(Category::FindQueryVariant),
        }
    }
}

/// Classifies an identifier node.
pub(crate) fn classify(node: JsNode<'_>, h: &Helpers<'_, '_>) -> Category {
    let Some(resolved) = resolve(node, h) else {
        return Category::None;
    };
    CallCheck::PRECEDENCE
        .into_iter()
        .find_map(|check| check.check(node, &resolved, h))
        .unwrap_or(Category::None)
}

fn resolve<'a>(node: JsNode<'a>, h: &Helpers<'a, '_>) -> Option<Resolved<'a>> {
    if !node.is(NodeKind::Identifier) {
        return None;
    }
    let local = node.text();
    let imports = h.imports;

    // ns.prop, screen.getByText, rtl.fireEvent.click: origin of the chain root
    if let Some(member) = member_with_property(node) {
        let root = member.field("object").and_then(leftmost_identifier);
        let origin = match root.map(|r| r.text()) {
            Some(name) if imports.binding(name).is_some() => Origin::Family,
            Some(name) if imports.is_foreign(name) => Origin::Foreign,
            _ => Origin::Unbound,
        };
        return Some(Resolved {
            local,
            canonical: None,
            origin,
        });
    }

    let resolved = match imports.binding(local) {
        Some(binding) if binding.is_namespace_import() => return None,
        Some(binding) => Resolved {
            local,
            canonical: (binding.kind == BindingKind::Named).then_some(binding.exported.as_str()),
            origin: Origin::Family,
        },
        None if imports.is_foreign(local) => Resolved {
            local,
            canonical: None,
            origin: Origin::Foreign,
        },
        None => Resolved {
            local,
            canonical: None,
            origin: Origin::Unbound,
        },
    };
    Some(resolved)
}

fn is_potential(r: &Resolved<'_>, h: &Helpers<'_, '_>) -> bool {
    match r.origin {
        Origin::Family => true,
        Origin::Unbound => h.settings.aggressive_module_reporting,
        Origin::Foreign => false,
    }
}

/// The member expression `node` is the property of.
fn member_with_property<'t>(node: JsNode<'t>) -> Option<JsNode<'t>> {
    node.parent()
        .filter(|p| p.is(NodeKind::MemberExpression))
        .filter(|p| p.field("property") == Some(node))
}

fn is_callee(node: JsNode<'_>) -> bool {
    node.parent().is_some_and(|p| {
        p.is(NodeKind::CallExpression) && p.field("function") == Some(node)
    })
}

/// Leftmost plain identifier of a member/call chain.
fn leftmost_identifier(mut node: JsNode<'_>) -> Option<JsNode<'_>> {
    loop {
        node = match node.raw_kind() {
            "identifier" => return Some(node),
            "member_expression" => node.field("object")?,
            "call_expression" => node.field("function")?,
            "non_null_expression" | "parenthesized_expression" => {
                node.named_children().into_iter().next()?
            }
            _ => return None,
        };
    }
}

fn is_user_event_method(node: JsNode<'_>, h: &Helpers<'_, '_>) -> bool {
    let user_event = match h.imports.user_event_name() {
        Some(name) => name,
        None if h.settings.aggressive_module_reporting => names::USER_EVENT_NAME,
        None => return false,
    };
    let Some(member) = member_with_property(node) else {
        return false;
    };
    let local = node.text();
    if local == user_event || local == names::USER_EVENT_NAME {
        return false;
    }
    member.field("object").is_some_and(|object| {
        object.raw_kind() == "identifier"
            && object.text() == user_event
            && !h.imports.is_foreign(user_event)
    })
}

/// `fireEvent` itself, possibly aliased or reached through a namespace.
pub(crate) fn is_fire_event_util(node: JsNode<'_>, h: &Helpers<'_, '_>) -> bool {
    resolve(node, h).is_some_and(|r| r.is_named(names::FIRE_EVENT_NAME) && is_potential(&r, h))
}

/// `fireEvent.click(..)`, `rtl.fireEvent.click(..)` or `fireEvent(..)`.
pub(crate) fn is_fire_event_method(node: JsNode<'_>, h: &Helpers<'_, '_>) -> bool {
    if !node.is(NodeKind::Identifier) {
        return false;
    }
    let Some(member) = member_with_property(node) else {
        return is_callee(node) && is_fire_event_util(node, h);
    };
    if !is_callee(member) || node.text() == names::FIRE_EVENT_NAME {
        return false;
    }
    let Some(object) = member.field("object") else {
        return false;
    };
    match object.raw_kind() {
        "identifier" => is_fire_event_util(object, h),
        "member_expression" => object
            .field("property")
            .is_some_and(|p| is_fire_event_util(p, h)),
        _ => false,
    }
}

/// Debug helpers such as `debug` or `prettyDOM`, but not `console.debug`.
pub(crate) fn is_debug_util(node: JsNode<'_>, h: &Helpers<'_, '_>) -> bool {
    let on_console = member_with_property(node)
        .and_then(|m| m.field("object"))
        .is_some_and(|o| o.raw_kind() == "identifier" && o.text() == "console");
    !on_console
        && resolve(node, h)
            .is_some_and(|r| r.named_in(names::DEBUG_UTILS).is_some() && is_potential(&r, h))
}

pub(crate) fn is_act_util(node: JsNode<'_>, h: &Helpers<'_, '_>) -> bool {
    resolve(node, h).is_some_and(|r| r.is_named(names::ACT_NAME) && is_potential(&r, h))
}

pub(crate) fn is_built_in_query(node: JsNode<'_>, h: &Helpers<'_, '_>) -> bool {
    resolve(node, h).is_some_and(|r| {
        names::is_built_in_query_name(r.local)
            || r.canonical.is_some_and(names::is_built_in_query_name)
    })
}

pub(crate) fn is_sync_query(node: JsNode<'_>, h: &Helpers<'_, '_>) -> bool {
    resolve(node, h).is_some_and(|r| r.has_prefix(names::SYNC_QUERY_PREFIXES))
}

pub(crate) fn is_async_query(node: JsNode<'_>, h: &Helpers<'_, '_>) -> bool {
    resolve(node, h).is_some_and(|r| r.has_prefix(names::ASYNC_QUERY_PREFIXES))
}
