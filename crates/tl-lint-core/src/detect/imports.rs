//! Per-file import tracking.
//!
//! Builds the alias table `local name -> CanonicalBinding` from `import`
//! declarations, `import x = require(..)` and CommonJS `require(..)`, and
//! remembers the last custom-module and testing-library imports.

use std::collections::{BTreeMap, BTreeSet};

use tl_lint_ts::{JsNode, NodeKind};

use super::names;
use crate::settings::{Framework, Settings};

/// How a local name was bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `import { a }`, `import { a as b }`, `const { a } = require(..)`
    Named,
    /// `import a from ..`
    Default,
    /// `import * as a`, `import a = require(..)`, `const a = require(..)`
    Namespace,
}

/// The (module, exported name) a local alias refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalBinding {
    /// Module specifier as written.
    pub module: String,
    /// Exported name; `default` and `*` for default and namespace bindings.
    pub exported: String,
    /// Binding form.
    pub kind: BindingKind,
}

impl CanonicalBinding {
    /// Whether the local name is the whole module object.
    #[must_use]
    pub fn is_namespace_import(&self) -> bool {
        self.kind == BindingKind::Namespace
    }
}

/// An import node together with the name it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord<'t> {
    /// The `import` declaration or `require(..)` call.
    pub node: JsNode<'t>,
    /// Recorded name.
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModuleClass {
    TestingLibrary(Option<Framework>),
    UserEvent,
    Custom,
    Foreign,
}

impl ModuleClass {
    fn of(specifier: &str, settings: &Settings) -> Self {
        if specifier == names::USER_EVENT_MODULE {
            return Self::UserEvent;
        }
        if let Some(framework) = names::testing_library_module(specifier) {
            return Self::TestingLibrary(framework);
        }
        if is_custom_module(specifier, settings) {
            return Self::Custom;
        }
        Self::Foreign
    }
}

fn is_custom_module(specifier: &str, settings: &Settings) -> bool {
    settings
        .custom_module
        .as_deref()
        .is_some_and(|custom| names::matches_custom_module(specifier, custom))
}

struct Binding {
    local: String,
    exported: String,
    kind: BindingKind,
}

/// Alias table and import records for one file.
#[derive(Debug, Default)]
pub struct ImportTracker<'t> {
    aliases: BTreeMap<String, CanonicalBinding>,
    foreign: BTreeSet<String>,
    user_event_name: Option<String>,
    custom_module: Option<ImportRecord<'t>>,
    testing_library: Option<ImportRecord<'t>>,
    detected_framework: Option<Framework>,
}

impl<'t> ImportTracker<'t> {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the bindings of an `import` declaration.
    pub fn observe_import(&mut self, declaration: JsNode<'t>, settings: &Settings) {
        if !declaration.is(NodeKind::ImportDeclaration) {
            return;
        }

        // import x = require('..')
        if let Some(clause) = declaration.child_of_raw_kind("import_require_clause") {
            let Some(specifier) = module_source(&clause) else {
                return;
            };
            let bindings: Vec<Binding> = clause
                .child_of_raw_kind("identifier")
                .map(|id| Binding {
                    local: id.text().to_owned(),
                    exported: "*".to_owned(),
                    kind: BindingKind::Namespace,
                })
                .into_iter()
                .collect();
            self.record(declaration, specifier, &bindings, settings);
            return;
        }

        let Some(specifier) = module_source(&declaration) else {
            return;
        };
        let bindings = declaration
            .child_of_raw_kind("import_clause")
            .map(|clause| import_clause_bindings(&clause))
            .unwrap_or_default();
        self.record(declaration, specifier, &bindings, settings);
    }

    /// Records a CommonJS `require('..')` call. Other calls are ignored.
    pub fn observe_require(&mut self, call: JsNode<'t>, settings: &Settings) {
        let Some(specifier) = require_specifier(&call) else {
            return;
        };

        let target = call
            .parent()
            .filter(|p| p.is(NodeKind::VariableDeclarator))
            .filter(|p| p.field("value") == Some(call))
            .and_then(|p| p.field("name"));
        let bindings = target.map(|t| pattern_bindings(&t)).unwrap_or_default();
        self.record(call, specifier, &bindings, settings);
    }

    fn record(
        &mut self,
        node: JsNode<'t>,
        specifier: &str,
        bindings: &[Binding],
        settings: &Settings,
    ) {
        let class = ModuleClass::of(specifier, settings);
        tracing::debug!(
            module = specifier,
            ?class,
            bindings = bindings.len(),
            "observed import"
        );

        for binding in bindings {
            if class == ModuleClass::Foreign {
                self.aliases.remove(&binding.local);
                self.foreign.insert(binding.local.clone());
                if self.user_event_name.as_deref() == Some(binding.local.as_str()) {
                    self.user_event_name = None;
                }
                continue;
            }

            self.foreign.remove(&binding.local);
            self.aliases.insert(
                binding.local.clone(),
                CanonicalBinding {
                    module: specifier.to_owned(),
                    exported: binding.exported.clone(),
                    kind: binding.kind,
                },
            );
            if class == ModuleClass::UserEvent && binding.kind != BindingKind::Named {
                self.user_event_name = Some(binding.local.clone());
            }
        }

        if let ModuleClass::TestingLibrary(framework) = class {
            self.testing_library = Some(ImportRecord {
                node,
                name: specifier.to_owned(),
            });
            if framework.is_some() {
                self.detected_framework = framework;
            }
        }

        if is_custom_module(specifier, settings) {
            let name = bindings
                .last()
                .map_or_else(|| specifier.to_owned(), |b| b.local.clone());
            self.custom_module = Some(ImportRecord { node, name });
        }
    }

    /// Canonical binding of a local name.
    #[must_use]
    pub fn binding(&self, local: &str) -> Option<&CanonicalBinding> {
        self.aliases.get(local)
    }

    /// All tracked aliases, ordered by local name.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &CanonicalBinding)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether the local name was last imported from an unrelated module.
    #[must_use]
    pub fn is_foreign(&self, local: &str) -> bool {
        self.foreign.contains(local)
    }

    /// Local name of the imported user-event object.
    #[must_use]
    pub fn user_event_name(&self) -> Option<&str> {
        self.user_event_name.as_deref()
    }

    /// Last custom-module import.
    #[must_use]
    pub fn custom_module(&self) -> Option<&ImportRecord<'t>> {
        self.custom_module.as_ref()
    }

    /// Last testing-library import.
    #[must_use]
    pub fn testing_library(&self) -> Option<&ImportRecord<'t>> {
        self.testing_library.as_ref()
    }

    /// Framework implied by the last adapter import.
    #[must_use]
    pub fn detected_framework(&self) -> Option<Framework> {
        self.detected_framework
    }
}

fn module_source<'t>(node: &JsNode<'t>) -> Option<&'t str> {
    node.field("source")
        .or_else(|| node.child_of_raw_kind("string"))
        .and_then(|s| s.string_value())
}

fn import_clause_bindings(clause: &JsNode<'_>) -> Vec<Binding> {
    let mut bindings = Vec::new();
    for child in clause.named_children() {
        match child.raw_kind() {
            "identifier" => bindings.push(Binding {
                local: child.text().to_owned(),
                exported: "default".to_owned(),
                kind: BindingKind::Default,
            }),
            "namespace_import" => {
                if let Some(id) = child.child_of_raw_kind("identifier") {
                    bindings.push(Binding {
                        local: id.text().to_owned(),
                        exported: "*".to_owned(),
                        kind: BindingKind::Namespace,
                    });
                }
            }
            "named_imports" => {
                for spec in child.named_children() {
                    if spec.raw_kind() != "import_specifier" {
                        continue;
                    }
                    let Some(name) = spec.field("name") else {
                        continue;
                    };
                    let exported = name.string_value().unwrap_or_else(|| name.text());
                    let local = spec.field("alias").map_or(exported, |a| a.text());
                    bindings.push(Binding {
                        local: local.to_owned(),
                        exported: exported.to_owned(),
                        kind: BindingKind::Named,
                    });
                }
            }
            _ => {}
        }
    }
    bindings
}

fn require_specifier<'t>(call: &JsNode<'t>) -> Option<&'t str> {
    if !call.is(NodeKind::CallExpression) {
        return None;
    }
    let callee = call.field("function")?;
    if callee.raw_kind() != "identifier" || callee.text() != names::REQUIRE {
        return None;
    }
    let args = call.field("arguments")?.named_children();
    match args.as_slice() {
        [arg] => arg.string_value(),
        _ => None,
    }
}

/// Bindings introduced by the left-hand side of `<pattern> = require(..)`.
fn pattern_bindings(pattern: &JsNode<'_>) -> Vec<Binding> {
    match pattern.raw_kind() {
        "identifier" => vec![Binding {
            local: pattern.text().to_owned(),
            exported: "*".to_owned(),
            kind: BindingKind::Namespace,
        }],
        "object_pattern" => pattern
            .named_children()
            .iter()
            .filter_map(object_pattern_entry)
            .collect(),
        _ => Vec::new(),
    }
}

fn object_pattern_entry(entry: &JsNode<'_>) -> Option<Binding> {
    let named = |exported: &str, local: &str| Binding {
        local: local.to_owned(),
        exported: exported.to_owned(),
        kind: BindingKind::Named,
    };
    match entry.raw_kind() {
        "shorthand_property_identifier_pattern" => Some(named(entry.text(), entry.text())),
        // { a = fallback }
        "object_assignment_pattern" => {
            let left = entry.field("left")?;
            Some(named(left.text(), left.text()))
        }
        // { a: b } and { a: b = fallback }
        "pair_pattern" => {
            let key = entry.field("key")?;
            let exported = key.string_value().unwrap_or_else(|| key.text());
            let mut value = entry.field("value")?;
            if value.raw_kind() == "assignment_pattern" {
                value = value.field("left")?;
            }
            (value.raw_kind() == "identifier").then(|| named(exported, value.text()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_lint_ts::{Dialect, SourceTree};

    fn parse(src: &str) -> SourceTree {
        SourceTree::parse(src, Dialect::Tsx).expect("parse failed")
    }

    fn track<'t>(tree: &'t SourceTree, settings: &Settings) -> ImportTracker<'t> {
        let mut tracker = ImportTracker::new();
        for node in tree.root().descendants() {
            match node.kind() {
                NodeKind::ImportDeclaration => tracker.observe_import(node, settings),
                NodeKind::CallExpression => tracker.observe_require(node, settings),
                _ => {}
            }
        }
        tracker
    }

    fn binding(module: &str, exported: &str, kind: BindingKind) -> CanonicalBinding {
        CanonicalBinding {
            module: module.to_owned(),
            exported: exported.to_owned(),
            kind,
        }
    }

    #[test]
    fn records_all_import_forms() {
        let tree = parse(
            "import rtl, { render as r, screen } from '@testing-library/react';\n\
             import * as dom from '@testing-library/dom';\n",
        );
        let tracker = track(&tree, &Settings::default());

        assert_eq!(
            tracker.binding("r"),
            Some(&binding("@testing-library/react", "render", BindingKind::Named))
        );
        assert_eq!(
            tracker.binding("screen").map(|b| b.exported.as_str()),
            Some("screen")
        );
        assert_eq!(
            tracker.binding("rtl").map(|b| b.kind),
            Some(BindingKind::Default)
        );
        assert!(tracker.binding("dom").is_some_and(CanonicalBinding::is_namespace_import));
        assert!(tracker.binding("render").is_none());
        assert_eq!(tracker.detected_framework(), Some(Framework::Dom));
        assert_eq!(
            tracker.testing_library().map(|r| r.name.as_str()),
            Some("@testing-library/dom")
        );
    }

    #[test]
    fn foreign_modules_are_not_tracked() {
        let tree = parse("import { render } from 'react-dom';\nimport x from 'lodash';\n");
        let tracker = track(&tree, &Settings::default());
        assert_eq!(tracker.aliases().count(), 0);
        assert!(tracker.is_foreign("render"));
        assert!(tracker.testing_library().is_none());
    }

    #[test]
    fn last_import_wins() {
        let tree = parse(
            "import { render } from '@testing-library/react';\n\
             import { render } from 'somewhere-else';\n\
             import { screen } from 'somewhere-else';\n\
             import { screen } from '@testing-library/vue';\n",
        );
        let tracker = track(&tree, &Settings::default());
        assert!(tracker.binding("render").is_none());
        assert!(tracker.is_foreign("render"));
        assert_eq!(
            tracker.binding("screen").map(|b| b.module.as_str()),
            Some("@testing-library/vue")
        );
        assert!(!tracker.is_foreign("screen"));
    }

    #[test]
    fn custom_module_record() {
        let settings = Settings::default().with_custom_module("test-utils");
        let tree = parse(
            "import { render as customRender } from '../test-utils';\n\
             import { screen, within } from 'test-utils';\n\
             import 'other';\n",
        );
        let tracker = track(&tree, &settings);
        let record = tracker.custom_module().expect("no custom module record");
        assert_eq!(record.name, "within");
        assert_eq!(record.node.line(), 2);
        assert_eq!(
            tracker.binding("customRender"),
            Some(&binding("../test-utils", "render", BindingKind::Named))
        );
    }

    #[test]
    fn side_effect_custom_import_uses_specifier() {
        let settings = Settings::default().with_custom_module("custom-module-forced-report");
        let tree = parse("import 'custom-module-forced-report';\n");
        let tracker = track(&tree, &settings);
        assert_eq!(
            tracker.custom_module().map(|r| r.name.as_str()),
            Some("custom-module-forced-report")
        );
    }

    #[test]
    fn no_record_before_import() {
        let tracker = ImportTracker::new();
        assert!(tracker.custom_module().is_none());
        assert!(tracker.testing_library().is_none());
        assert!(tracker.user_event_name().is_none());
    }

    #[test]
    fn user_event_local_name() {
        let tree = parse("import ue from '@testing-library/user-event';\n");
        let tracker = track(&tree, &Settings::default());
        assert_eq!(tracker.user_event_name(), Some("ue"));
    }

    #[test]
    fn commonjs_require() {
        let tree = parse(
            "const { render, screen: s, waitFor = noop } = require('@testing-library/react');\n\
             const tl = require('@testing-library/dom');\n\
             require('@testing-library/jest-dom');\n\
             const path = require('path');\n",
        );
        let tracker = track(&tree, &Settings::default());
        assert_eq!(
            tracker.binding("s"),
            Some(&binding("@testing-library/react", "screen", BindingKind::Named))
        );
        assert!(tracker.binding("render").is_some());
        assert!(tracker.binding("waitFor").is_some());
        assert!(tracker.binding("tl").is_some_and(CanonicalBinding::is_namespace_import));
        assert!(tracker.is_foreign("path"));
    }

    #[test]
    fn typescript_import_require() {
        let tree = SourceTree::parse(
            "import rtl = require('@testing-library/react');\n",
            Dialect::TypeScript,
        )
        .expect("parse failed");
        let tracker = track(&tree, &Settings::default());
        assert!(tracker.binding("rtl").is_some_and(CanonicalBinding::is_namespace_import));
        assert_eq!(tracker.detected_framework(), Some(Framework::React));
    }
}
