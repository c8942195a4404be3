//! Canonical names of the testing-library family.

use crate::settings::Framework;

/// Core and adapter packages, with the framework each one implies.
pub const TESTING_LIBRARY_MODULES: &[(&str, Option<Framework>)] = &[
    ("@testing-library/dom", Some(Framework::Dom)),
    ("@testing-library/angular", Some(Framework::Angular)),
    ("@testing-library/react", Some(Framework::React)),
    ("@testing-library/vue", Some(Framework::Vue)),
    ("@testing-library/preact", None),
    ("@testing-library/svelte", None),
    ("@marko/testing-library", Some(Framework::Marko)),
];

/// Pre-scope package names.
pub const LEGACY_MODULES: &[(&str, Option<Framework>)] = &[
    ("dom-testing-library", Some(Framework::Dom)),
    ("react-testing-library", Some(Framework::React)),
    ("vue-testing-library", Some(Framework::Vue)),
];

/// The user-event package.
pub const USER_EVENT_MODULE: &str = "@testing-library/user-event";

/// Local name assumed for user-event when it was not imported.
pub const USER_EVENT_NAME: &str = "userEvent";

/// Built-in render function.
pub const RENDER_NAME: &str = "render";

/// Async wait utilities, current and deprecated.
pub const ASYNC_UTILS: &[&str] = &[
    "waitFor",
    "waitForElementToBeRemoved",
    "wait",
    "waitForElement",
    "waitForDomChange",
];

/// Query prefixes, get before query before find.
pub const SYNC_QUERY_PREFIXES: &[&str] = &["getBy", "getAllBy", "queryBy", "queryAllBy"];
/// Async query prefixes.
pub const ASYNC_QUERY_PREFIXES: &[&str] = &["findBy", "findAllBy"];

/// Built-in query suffixes.
pub const QUERY_METHODS: &[&str] = &[
    "LabelText",
    "PlaceholderText",
    "Text",
    "AltText",
    "Title",
    "DisplayValue",
    "Role",
    "TestId",
];

/// Matchers asserting an element is present.
pub const PRESENCE_MATCHERS: &[&str] = &["toBeInTheDocument", "toBeTruthy", "toBeDefined"];
/// Matchers asserting an element is absent.
pub const ABSENCE_MATCHERS: &[&str] = &["toBeNull", "toBeFalsy"];

/// Negation modifier in an `expect` chain.
pub const NOT: &str = "not";
/// Assertion anchor.
pub const EXPECT: &str = "expect";

/// Event dispatch utility.
pub const FIRE_EVENT_NAME: &str = "fireEvent";
/// Debugging helpers.
pub const DEBUG_UTILS: &[&str] = &[
    "debug",
    "logTestingPlaygroundURL",
    "prettyDOM",
    "logRoles",
    "logDOM",
    "prettyFormat",
];
/// `act` wrapper.
pub const ACT_NAME: &str = "act";

/// CommonJS loader.
pub const REQUIRE: &str = "require";

/// Framework implied by a testing-library module, `None` if the module is
/// not one or implies no framework flag.
#[must_use]
pub fn testing_library_module(specifier: &str) -> Option<Option<Framework>> {
    TESTING_LIBRARY_MODULES
        .iter()
        .chain(LEGACY_MODULES)
        .find(|(name, _)| *name == specifier)
        .map(|(_, framework)| *framework)
}

/// Whether `specifier` names the configured custom module.
///
/// Matches the exact name or a relative path ending with it
/// (`../test-utils` for `test-utils`).
#[must_use]
pub fn matches_custom_module(specifier: &str, custom: &str) -> bool {
    if custom.is_empty() {
        return false;
    }
    specifier == custom
        || specifier
            .strip_suffix(custom)
            .is_some_and(|head| head.ends_with('/'))
}

/// Whether the name is `getBy<Something>`/`getAllBy<Something>` and so on,
/// by convention only. The bare prefix does not count.
#[must_use]
pub fn has_prefix(name: &str, prefixes: &[&str]) -> bool {
    prefixes
        .iter()
        .filter_map(|p| name.strip_prefix(p))
        .any(|rest| !rest.is_empty())
}

/// Whether the name is one of the built-in prefix/method combinations.
#[must_use]
pub fn is_built_in_query_name(name: &str) -> bool {
    SYNC_QUERY_PREFIXES
        .iter()
        .chain(ASYNC_QUERY_PREFIXES)
        .filter_map(|p| name.strip_prefix(p))
        .any(|rest| QUERY_METHODS.contains(&rest))
}
