//! Platform builtin module detection.

/// Node.js builtin modules (without the `node:` prefix).
pub const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Check whether a specifier names a platform builtin.
///
/// `node:`-prefixed specifiers are always builtins. Bare specifiers match if
/// their package segment (the part before any `/`) is in the builtin list or
/// in the caller's extra list.
pub fn is_builtin(specifier: &str, extra: &[String]) -> bool {
    if specifier.starts_with("node:") {
        return true;
    }

    let package = specifier.split('/').next().unwrap_or(specifier);
    NODE_BUILTINS.contains(&package) || extra.iter().any(|b| b == package)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_prefix_is_always_builtin() {
        assert!(is_builtin("node:path", &[]));
        assert!(is_builtin("node:custom-thing", &[]));
    }

    #[test]
    fn bare_names_match_list() {
        assert!(is_builtin("fs", &[]));
        assert!(is_builtin("fs/promises", &[]));
        assert!(!is_builtin("react", &[]));
    }

    #[test]
    fn extra_builtins_extend_the_list() {
        let extra = vec!["deno".to_string()];
        assert!(is_builtin("deno", &extra));
        assert!(!is_builtin("deno-std", &extra));
    }
}
