use std::sync::LazyLock;

use regex::Regex;

// Multi-tab counters browsers append to a window title, with everything after them.
static TAB_COUNTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r" (?:和另外 \d+ 个页面|and \d+ more pages?).*$").expect("valid tab counter regex")
});

// Browser chrome suffixes, including Edge's zero-width-space spelling.
static BROWSER_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r" - (?:Microsoft\x{200B}? Edge|Google Chrome)$").expect("valid browser suffix regex")
});

/// Strip the dynamic parts of a browser title.
///
/// Applied until nothing changes, so `clean_title(clean_title(t)) == clean_title(t)`.
pub fn clean_title(title: &str) -> String {
    let mut current = title.trim().to_string();
    loop {
        let stripped = TAB_COUNTER.replace(&current, "");
        let stripped = BROWSER_SUFFIX.replace(&stripped, "");
        let next = stripped.trim().to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}
