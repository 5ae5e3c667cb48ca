//! Message condensation for fixed-width SMS delivery.
//!
//! SMS bodies are capped at 160 characters, while task responses are
//! unbounded free-form text that may contain URLs and code blocks. The
//! condenser deterministically compresses any input into the budget, in a
//! fixed order:
//!
//! 1. URL-shaped substrings become `[URL]`
//! 2. Fenced code blocks become `[CODE]`
//! 3. Whitespace runs (including newlines) collapse to single spaces,
//!    leading/trailing whitespace is trimmed
//! 4. Anything still longer than `max_len - 3` characters is cut hard and
//!    suffixed with `...`
//!
//! The cut is not word-boundary aware; mid-word truncation is the price of
//! a guaranteed length bound.

use std::sync::OnceLock;

use regex::Regex;

/// SMS body budget in characters.
pub const SMS_MAX_LEN: usize = 160;

/// Label prefixed to every composed message.
const MESSAGE_LABEL: &str = "TaskPing";

/// Truncation marker appended to cut messages.
const ELLIPSIS: &str = "...";

/// Placeholder substituted for URL-shaped substrings.
const URL_PLACEHOLDER: &str = "[URL]";

/// Placeholder substituted for fenced code blocks.
const CODE_PLACEHOLDER: &str = "[CODE]";

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?://\S+").expect("valid URL pattern"))
}

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"```[\s\S]*?```").expect("valid code fence pattern"))
}

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

/// Condenses `text` to at most `max_len` characters.
///
/// Pure and deterministic: the same input always yields the same output,
/// and `condense(condense(s, n), n) == condense(s, n)`. `max_len` must be
/// at least 3 (the length of the truncation marker).
///
/// # Example
///
/// ```
/// use taskping_relay::condense::condense;
///
/// let out = condense("see   https://example.com/long/path\nfor details", 160);
/// assert_eq!(out, "see [URL] for details");
/// ```
#[must_use]
pub fn condense(text: &str, max_len: usize) -> String {
    debug_assert!(max_len >= ELLIPSIS.len());

    let text = url_pattern().replace_all(text, URL_PLACEHOLDER);
    let text = code_pattern().replace_all(&text, CODE_PLACEHOLDER);
    let text = whitespace_pattern().replace_all(&text, " ");
    let text = text.trim();

    let budget = max_len.saturating_sub(ELLIPSIS.len());
    if text.chars().count() > budget {
        let cut: String = text.chars().take(budget).collect();
        format!("{cut}{ELLIPSIS}")
    } else {
        text.to_string()
    }
}

/// Composes the SMS body for a task-completion notification.
///
/// Success messages carry the first 30 characters of the task and a
/// 100-character condensation of the response; failure messages carry up to
/// 50 characters of the task. The composed string is condensed once more at
/// the full budget because the label and task prefix can push the total
/// over 160.
#[must_use]
pub fn compose_sms(task: &str, response: &str, success: bool) -> String {
    let message = if success {
        let task_summary = if task.is_empty() {
            "Task completed".to_string()
        } else {
            format!("Task: {}", truncate_chars(task, 30))
        };
        let response_summary = condense(response, 100);
        format!("{MESSAGE_LABEL}: {task_summary}. {response_summary}")
            .trim()
            .to_string()
    } else {
        let detail = if task.is_empty() {
            "Unknown error".to_string()
        } else {
            truncate_chars(task, 50)
        };
        format!("{MESSAGE_LABEL}: Task failed. {detail}")
    };

    condense(&message, SMS_MAX_LEN)
}

/// Takes the first `n` characters of `s`.
fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_replaced_with_placeholder() {
        let out = condense("Visit https://example.com/very/long/path now", 160);
        assert_eq!(out, "Visit [URL] now");
    }

    #[test]
    fn code_blocks_are_replaced_with_placeholder() {
        let out = condense("Fixed it:\n```rust\nfn main() {}\n```\nall green", 160);
        assert_eq!(out, "Fixed it: [CODE] all green");
    }

    #[test]
    fn whitespace_runs_collapse_and_edges_trim() {
        let out = condense("  a\n\n  b\t\tc  ", 160);
        assert_eq!(out, "a b c");
    }

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        let out = condense(&"x".repeat(500), 160);
        assert_eq!(out.chars().count(), 160);
        assert!(out.ends_with("..."));
        assert_eq!(&out[..157], "x".repeat(157));
    }

    #[test]
    fn short_text_passes_through() {
        assert_eq!(condense("all done", 160), "all done");
    }

    #[test]
    fn url_scenario_at_tight_budget() {
        // After substitution and collapsing: "Visit [URL] now" (15 chars),
        // which fits the 17-character budget untruncated.
        let out = condense("Visit https://example.com/very/long/path now", 20);
        assert_eq!(out, "Visit [URL] now");

        // A longer tail forces the truncation path.
        let out = condense("Visit https://example.com/very/long/path right now please", 20);
        assert_eq!(out.chars().count(), 20);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn output_never_exceeds_max_len() {
        let inputs = [
            String::new(),
            "short".to_string(),
            "word ".repeat(100),
            "https://a.example/b ".repeat(40),
            "```\ncode\n``` and more ```\ncode\n```".to_string(),
            "無境界の長い文字列".repeat(30),
        ];
        for input in &inputs {
            for max_len in [3, 4, 17, 20, 100, 160] {
                let out = condense(input, max_len);
                assert!(
                    out.chars().count() <= max_len,
                    "condense({input:?}, {max_len}) produced {} chars",
                    out.chars().count()
                );
            }
        }
    }

    #[test]
    fn condense_is_idempotent() {
        let inputs = [
            "plain text under budget",
            &"long ".repeat(100),
            "mixed https://example.com and\n```\ncode\n```\nand length length length length",
        ];
        for input in inputs {
            for max_len in [3, 20, 160] {
                let once = condense(input, max_len);
                assert_eq!(condense(&once, max_len), once);
            }
        }
    }

    #[test]
    fn minimum_budget_yields_bare_ellipsis() {
        assert_eq!(condense("anything at all", 3), "...");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let out = condense(&"é".repeat(300), 10);
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn compose_success_includes_label_and_task() {
        let out = compose_sms("fix bug", "Task completed: fix bug", true);
        assert_eq!(out, "TaskPing: Task: fix bug. Task completed: fix bug");
    }

    #[test]
    fn compose_success_with_empty_task() {
        let out = compose_sms("", "all green", true);
        assert_eq!(out, "TaskPing: Task completed. all green");
    }

    #[test]
    fn compose_failure_carries_task_detail() {
        let out = compose_sms("deploy the service", "", false);
        assert_eq!(out, "TaskPing: Task failed. deploy the service");
    }

    #[test]
    fn compose_failure_with_empty_task() {
        let out = compose_sms("", "", false);
        assert_eq!(out, "TaskPing: Task failed. Unknown error");
    }

    #[test]
    fn compose_never_exceeds_sms_budget() {
        let task = "a task with a very long description ".repeat(10);
        let response = "and an even longer response body ".repeat(40);
        let out = compose_sms(&task, &response, true);
        assert!(out.chars().count() <= SMS_MAX_LEN);
    }

    #[test]
    fn compose_truncates_task_prefix_to_thirty_chars() {
        let task = "abcdefghijklmnopqrstuvwxyz0123456789";
        let out = compose_sms(task, "", true);
        assert!(out.starts_with("TaskPing: Task: abcdefghijklmnopqrstuvwxyz0123."));
    }
}
