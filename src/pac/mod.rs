//! PAC (Proxy Auto-Config) script generation.
//!
//! The script embeds three literal tables (`methods`, `hosts`, `topLevel`)
//! followed by a `FindProxyForURL` runtime that applies the same rules as
//! [`classify_request`](crate::engine::classify_request).

mod escape;

pub use escape::js_escape;

use crate::engine::{DomainList, PolicyConfiguration, RoutingMethod};

const RUNTIME: &str = include_str!("runtime.js");

/// MIME type browsers expect for PAC files.
pub const CONTENT_TYPE: &str = "application/x-ns-proxy-autoconfig";

/// Renders the PAC script for `policy`.
///
/// Output depends only on the policy: list entries appear in insertion
/// order and top-level labels in sorted order.
pub fn render(policy: &PolicyConfiguration) -> String {
    let mut out = String::with_capacity(
        1024 + RUNTIME.len() + 32 * (policy.direct().len() + policy.blocked().len()),
    );

    out.push_str("// Generated by pac-router. Do not edit.\n\nvar methods = {\n");
    let methods: Vec<String> = RoutingMethod::ALL
        .iter()
        .map(|m| {
            format!(
                "    {}: \"{}\"",
                m.as_str(),
                js_escape(&policy.transport(*m).to_string())
            )
        })
        .collect();
    out.push_str(&methods.join(",\n"));
    out.push_str("\n};\n\nvar hosts = {\n    direct: [");
    push_list(&mut out, policy.direct());
    out.push_str("],\n    blocked: [");
    push_list(&mut out, policy.blocked());
    out.push_str("]\n};\n\nvar topLevel = {");

    let labels: Vec<String> = policy
        .top_level()
        .iter()
        .map(|label| format!("    \"{}\": true", js_escape(label)))
        .collect();
    if !labels.is_empty() {
        out.push('\n');
        out.push_str(&labels.join(",\n"));
        out.push('\n');
    }
    out.push_str("};\n");
    out.push_str(RUNTIME);
    out
}

fn push_list(out: &mut String, list: &DomainList) {
    if list.is_empty() {
        return;
    }
    let entries: Vec<String> = list
        .iter()
        .map(|entry| format!("        \"{}\"", js_escape(entry)))
        .collect();
    out.push('\n');
    out.push_str(&entries.join(",\n"));
    out.push_str("\n    ");
}
