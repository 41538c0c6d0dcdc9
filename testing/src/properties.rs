//! Property-based testing strategies for API types.

use composable_api_core::method::HttpMethod;
use proptest::prelude::*;

/// Any HTTP method.
pub fn arb_method() -> impl Strategy<Value = HttpMethod> {
    prop_oneof![
        Just(HttpMethod::Get),
        Just(HttpMethod::Post),
        Just(HttpMethod::Put),
        Just(HttpMethod::Patch),
        Just(HttpMethod::Delete),
        Just(HttpMethod::Head),
        Just(HttpMethod::Options),
    ]
}

/// A placeholder name: the characters interpolation treats as a name.
pub fn arb_param_name() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,11}"
}

/// An endpoint template of up to four segments, some of them `:placeholders`.
pub fn arb_template() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-z]{1,8}",
            arb_param_name().prop_map(|name| format!(":{name}")),
        ],
        1..=4,
    )
    .prop_map(|segments| format!("/{}", segments.join("/")))
}
