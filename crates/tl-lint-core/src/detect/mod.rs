//! Testing-library usage detection.
//!
//! The engine registers its own listeners ahead of every rule's listeners
//! (see [`tracking_listeners`]) to build the per-file [`FileState`]. Rules
//! then classify nodes through [`Helpers`], a read-only view of that state.
//!
//! ```ignore
//! Listeners::new().on(
//!     "CallExpression Identifier".parse()?,
//!     |node, ctx: &mut RuleContext<'_>| {
//!         if ctx.helpers().is_render_util(node) {
//!             ctx.report(node, "render call");
//!         }
//!     },
//! )
//! ```

pub mod asserts;
pub mod calls;
pub mod imports;
pub mod names;

use tl_lint_ts::{JsNode, Listeners, NodeKind, Selector};

pub use calls::CallCheck;
pub use imports::{BindingKind, CanonicalBinding, ImportRecord, ImportTracker};

use crate::rule::RuleContext;
use crate::settings::{Framework, Settings};

/// What a node is, as far as testing-library usage goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// `render` or a render wrapper.
    Render,
    /// An async wait utility, with its exported name when imported by
    /// name, else the local name.
    AsyncUtil(&'static str),
    /// A method called on the user-event object.
    UserEventMethod,
    /// A configured custom query.
    CustomQuery,
    /// `getBy*` / `getAllBy*`
    GetQueryVariant,
    /// `queryBy*` / `queryAllBy*`
    QueryQueryVariant,
    /// `findBy*` / `findAllBy*`
    FindQueryVariant,
    /// `expect(..)` chain asserting presence.
    PresenceAssert,
    /// `expect(..)` chain asserting absence.
    AbsenceAssert,
    /// Anything else.
    None,
}

/// Detection state of one file, for one rule run.
#[derive(Debug, Default)]
pub struct FileState<'t> {
    imports: ImportTracker<'t>,
    finished: bool,
}

impl<'t> FileState<'t> {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Import tracker.
    #[must_use]
    pub fn imports(&self) -> &ImportTracker<'t> {
        &self.imports
    }

    /// Whether the whole file was traversed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn observe_import(&mut self, node: JsNode<'t>, settings: &Settings) {
        self.imports.observe_import(node, settings);
    }

    pub(crate) fn observe_require(&mut self, node: JsNode<'t>, settings: &Settings) {
        self.imports.observe_require(node, settings);
    }

    pub(crate) fn finish(&mut self) {
        self.finished = true;
    }
}

/// Read-only classification queries over the current file state.
///
/// Every predicate is a pure function of the state and the given node.
#[derive(Debug, Clone, Copy)]
pub struct Helpers<'a, 't> {
    settings: &'a Settings,
    imports: &'a ImportTracker<'t>,
    finished: bool,
}

impl<'a, 't> Helpers<'a, 't> {
    /// Creates helpers over `state`.
    #[must_use]
    pub fn new(settings: &'a Settings, state: &'a FileState<'t>) -> Self {
        Self {
            settings,
            imports: &state.imports,
            finished: state.finished,
        }
    }

    /// Category of an identifier or member-expression node.
    #[must_use]
    pub fn category(&self, node: JsNode<'_>) -> Category {
        match node.kind() {
            NodeKind::Identifier => calls::classify(node, self),
            NodeKind::MemberExpression => asserts::classify(node),
            _ => Category::None,
        }
    }

    /// `render`, an aliased `render` or a render wrapper.
    #[must_use]
    pub fn is_render_util(&self, node: JsNode<'_>) -> bool {
        self.category(node) == Category::Render
    }

    /// `waitFor` and the other async utilities.
    #[must_use]
    pub fn is_async_util(&self, node: JsNode<'_>) -> bool {
        matches!(self.category(node), Category::AsyncUtil(_))
    }

    /// Canonical name of the async utility `node` refers to.
    #[must_use]
    pub fn async_util_name(&self, node: JsNode<'_>) -> Option<&'static str> {
        match self.category(node) {
            Category::AsyncUtil(name) => Some(name),
            _ => None,
        }
    }

    /// Property of a `userEvent.<method>` access.
    #[must_use]
    pub fn is_user_event_method(&self, node: JsNode<'_>) -> bool {
        self.category(node) == Category::UserEventMethod
    }

    /// A configured custom query.
    #[must_use]
    pub fn is_custom_query(&self, node: JsNode<'_>) -> bool {
        self.category(node) == Category::CustomQuery
    }

    /// `getBy*` / `getAllBy*`
    #[must_use]
    pub fn is_get_query_variant(&self, node: JsNode<'_>) -> bool {
        self.category(node) == Category::GetQueryVariant
    }

    /// `queryBy*` / `queryAllBy*`
    #[must_use]
    pub fn is_query_query_variant(&self, node: JsNode<'_>) -> bool {
        self.category(node) == Category::QueryQueryVariant
    }

    /// `findBy*` / `findAllBy*`
    #[must_use]
    pub fn is_find_query_variant(&self, node: JsNode<'_>) -> bool {
        self.category(node) == Category::FindQueryVariant
    }

    /// `expect(..).toBeInTheDocument()` and equivalents.
    #[must_use]
    pub fn is_presence_assert(&self, node: JsNode<'_>) -> bool {
        self.category(node) == Category::PresenceAssert
    }

    /// `expect(..).not.toBeInTheDocument()` and equivalents.
    #[must_use]
    pub fn is_absence_assert(&self, node: JsNode<'_>) -> bool {
        self.category(node) == Category::AbsenceAssert
    }

    /// `fireEvent`, however it was imported.
    #[must_use]
    pub fn is_fire_event_util(&self, node: JsNode<'_>) -> bool {
        calls::is_fire_event_util(node, self)
    }

    /// An event dispatched through `fireEvent`.
    #[must_use]
    pub fn is_fire_event_method(&self, node: JsNode<'_>) -> bool {
        calls::is_fire_event_method(node, self)
    }

    /// `debug`, `prettyDOM`, `logRoles` and friends.
    #[must_use]
    pub fn is_debug_util(&self, node: JsNode<'_>) -> bool {
        calls::is_debug_util(node, self)
    }

    /// `act`
    #[must_use]
    pub fn is_act_util(&self, node: JsNode<'_>) -> bool {
        calls::is_act_util(node, self)
    }

    /// One of the built-in queries, such as `getByRole` or `findAllByText`.
    #[must_use]
    pub fn is_built_in_query(&self, node: JsNode<'_>) -> bool {
        calls::is_built_in_query(node, self)
    }

    /// `get*` or `query*` query, by name.
    #[must_use]
    pub fn is_sync_query(&self, node: JsNode<'_>) -> bool {
        calls::is_sync_query(node, self)
    }

    /// `find*` query, by name.
    #[must_use]
    pub fn is_async_query(&self, node: JsNode<'_>) -> bool {
        calls::is_async_query(node, self)
    }

    /// Last import of the custom module.
    #[must_use]
    pub fn custom_module_import_node(&self) -> Option<JsNode<'t>> {
        self.imports.custom_module().map(|r| r.node)
    }

    /// Name recorded for the last custom-module import.
    #[must_use]
    pub fn custom_module_import_name(&self) -> Option<&'a str> {
        self.imports.custom_module().map(|r| r.name.as_str())
    }

    /// Last testing-library import.
    #[must_use]
    pub fn testing_library_import_node(&self) -> Option<JsNode<'t>> {
        self.imports.testing_library().map(|r| r.node)
    }

    /// Module specifier of the last testing-library import.
    #[must_use]
    pub fn testing_library_import_name(&self) -> Option<&'a str> {
        self.imports.testing_library().map(|r| r.name.as_str())
    }

    /// Whether testing-library utilities may be in use in this file.
    #[must_use]
    pub fn is_testing_library_imported(&self) -> bool {
        self.settings.aggressive_module_reporting
            || self.imports.testing_library().is_some()
            || self.imports.custom_module().is_some()
    }

    /// Configured framework, else the one implied by imports.
    #[must_use]
    pub fn framework(&self) -> Option<Framework> {
        self.settings
            .framework
            .or_else(|| self.imports.detected_framework())
    }

    /// Whether the whole file was traversed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Settings in effect.
    #[must_use]
    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    /// Import tracker.
    #[must_use]
    pub fn imports(&self) -> &'a ImportTracker<'t> {
        self.imports
    }
}

/// Listeners maintaining [`FileState`]. Chained before a rule's own listeners.
pub(crate) fn tracking_listeners<'t>() -> Listeners<'t, RuleContext<'t>> {
    Listeners::new()
        .on(
            Selector::Kind(NodeKind::ImportDeclaration),
            |node, ctx: &mut RuleContext<'t>| ctx.observe_import(node),
        )
        .on(
            Selector::Kind(NodeKind::CallExpression),
            |node, ctx: &mut RuleContext<'t>| ctx.observe_require(node),
        )
        .on(Selector::ProgramExit, |_, ctx: &mut RuleContext<'t>| {
            ctx.finish();
        })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::PathBuf;

    use tl_lint_ts::{walk, Dialect, JsNode, Listeners, NodeKind, SourceTree};

    use super::tracking_listeners;
    use crate::rule::{Rule, RuleContext};
    use crate::Settings;

    struct Inert;

    impl Rule for Inert {
        fn name(&self) -> &'static str {
            "inert"
        }
        fn code(&self) -> &'static str {
            "TL000"
        }
        fn create<'t>(&'t self) -> Listeners<'t, RuleContext<'t>> {
            Listeners::new()
        }
    }

    pub(crate) fn parse(src: &str) -> SourceTree {
        SourceTree::parse(src, Dialect::Tsx).expect("parse failed")
    }

    /// Runs only the engine listeners over `tree`.
    pub(crate) fn scan(tree: &SourceTree, settings: Settings) -> RuleContext<'_> {
        let mut ctx = RuleContext::new(&Inert, PathBuf::from("test.tsx"), settings);
        let mut listeners = tracking_listeners();
        walk(tree, &mut listeners, &mut ctx);
        ctx
    }

    /// The `nth` identifier (0-based) with the given text.
    pub(crate) fn nth_ident<'t>(tree: &'t SourceTree, name: &str, nth: usize) -> JsNode<'t> {
        tree.root()
            .descendants()
            .into_iter()
            .filter(|n| n.is(NodeKind::Identifier) && n.text() == name)
            .nth(nth)
            .unwrap_or_else(|| panic!("no identifier #{nth} named {name}"))
    }

    pub(crate) fn ident<'t>(tree: &'t SourceTree, name: &str) -> JsNode<'t> {
        nth_ident(tree, name, 0)
    }
}
