//! Package-name validity
//!
//! Follows the npm registry naming rules. Problems that make a name unusable
//! for any package are errors; problems that only bar newly published
//! packages are warnings.

const MAX_LENGTH: usize = 214;

const BLACKLIST: &[&str] = &["node_modules", "favicon.ico"];

/// Node.js core module names, reserved for new packages
const CORE_MODULES: &[&str] = &[
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

/// Outcome of validating a package name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Validation {
    pub fn valid_for_old_packages(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn valid_for_new_packages(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Validate `name` against the registry naming rules
pub fn validate(name: &str) -> Validation {
    let mut v = Validation::default();

    if name.is_empty() {
        v.errors.push("name length must be greater than zero".to_string());
    }
    if name.starts_with('.') {
        v.errors.push("name cannot start with a period".to_string());
    }
    if name.starts_with('_') {
        v.errors.push("name cannot start with an underscore".to_string());
    }
    if name.trim() != name {
        v.errors
            .push("name cannot contain leading or trailing spaces".to_string());
    }

    let lower = name.to_lowercase();
    for blacklisted in BLACKLIST {
        if lower == *blacklisted {
            v.errors.push(format!("{} is a blacklisted name", blacklisted));
        }
    }
    for core in CORE_MODULES {
        if lower == *core {
            v.warnings.push(format!("{} is a core module name", core));
        }
    }

    if name.chars().count() > MAX_LENGTH {
        v.warnings.push(format!(
            "name can no longer contain more than {} characters",
            MAX_LENGTH
        ));
    }
    if lower != name {
        v.warnings
            .push("name can no longer contain capital letters".to_string());
    }

    let last_segment = name.rsplit('/').next().unwrap_or(name);
    if last_segment.contains(['~', '\'', '!', '(', ')', '*']) {
        v.warnings.push(
            "name can no longer contain special characters (\"~'!()*\")".to_string(),
        );
    }

    if !is_url_safe(name) && !is_url_safe_scoped(name) {
        v.errors
            .push("name can only contain URL-friendly characters".to_string());
    }

    v
}

/// True when `name` is acceptable for both old and new packages
pub fn is_valid_package_name(name: &str) -> bool {
    let v = validate(name);
    v.valid_for_new_packages() && v.valid_for_old_packages()
}

/// Characters left untouched by URI component encoding
fn is_url_safe(s: &str) -> bool {
    s.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || matches!(c, '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')')
    })
}

/// `@scope/name` where both halves are URL-safe
fn is_url_safe_scoped(name: &str) -> bool {
    let Some(rest) = name.strip_prefix('@') else {
        return false;
    };
    match rest.split_once('/') {
        Some((scope, pkg)) => {
            !scope.is_empty()
                && !pkg.is_empty()
                && !pkg.contains('/')
                && is_url_safe(scope)
                && is_url_safe(pkg)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_are_valid() {
        assert!(is_valid_package_name("verb"));
        assert!(is_valid_package_name("generate"));
        assert!(is_valid_package_name("arr-union"));
        assert!(is_valid_package_name("lodash.merge"));
        assert!(is_valid_package_name("1.2.3"));
    }

    #[test]
    fn test_errors() {
        assert!(!validate("").valid_for_old_packages());
        assert!(!validate(".hidden").valid_for_old_packages());
        assert!(!validate("_private").valid_for_old_packages());
        assert!(!validate(" padded ").valid_for_old_packages());
        assert!(!validate("node_modules").valid_for_old_packages());
        assert!(!validate("has space").valid_for_old_packages());
        assert!(!validate("a/b").valid_for_old_packages());
    }

    #[test]
    fn test_warnings_only_bar_new_packages() {
        let v = validate("Verb");
        assert!(v.valid_for_old_packages());
        assert!(!v.valid_for_new_packages());
        assert!(!is_valid_package_name("Verb"));

        let v = validate("fs");
        assert!(v.valid_for_old_packages());
        assert_eq!(v.warnings, vec!["fs is a core module name".to_string()]);

        assert!(!is_valid_package_name("wow!"));
        assert!(!is_valid_package_name(&"a".repeat(215)));
        assert!(is_valid_package_name(&"a".repeat(214)));
    }

    #[test]
    fn test_scoped_names() {
        assert!(is_valid_package_name("@verb/core"));
        assert!(!is_valid_package_name("@/core"));
        assert!(!is_valid_package_name("@verb/a/b"));
    }
}
