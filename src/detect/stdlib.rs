//! Go standard library detection.
//!
//! Membership is decided by the first path segment against an embedded
//! prefix table, so `encoding/json` and `net/http` resolve without
//! listing every subpackage.

use phf::phf_set;

/// First path segments of the Go standard library.
static GO_STDLIB_PREFIXES: phf::Set<&'static str> = phf_set! {
    "archive", "bufio", "builtin", "bytes", "cmp", "compress", "container",
    "context", "crypto", "database", "debug", "embed", "encoding", "errors",
    "expvar", "flag", "fmt", "go", "hash", "html", "image", "index", "io",
    "iter", "log", "maps", "math", "mime", "net", "os", "path", "plugin",
    "reflect", "regexp", "runtime", "slices", "sort", "strconv", "strings",
    "structs", "sync", "syscall", "testing", "text", "time", "unicode",
    "unsafe",
};

/// Whether an import path belongs to the Go standard library.
pub fn is_stdlib_import(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or(path);
    GO_STDLIB_PREFIXES.contains(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdlib_paths() {
        assert!(is_stdlib_import("fmt"));
        assert!(is_stdlib_import("net/http"));
        assert!(is_stdlib_import("encoding/json"));
        assert!(is_stdlib_import("os/signal"));
    }

    #[test]
    fn test_non_stdlib_paths() {
        assert!(!is_stdlib_import("github.com/spf13/cobra"));
        assert!(!is_stdlib_import("myapp/internal/config"));
        assert!(!is_stdlib_import("example.com/pkg"));
    }
}
