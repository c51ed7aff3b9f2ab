use super::store::SEPARATOR_COMMENT;
use regex::Regex;

const RULE_START: &str = "SecRule";
const COMMENT_START: &str = "#";

/// Whether `line` carries the identifier `id`.
///
/// Two spellings are recognized: the quoted marker `id "<id>"` and the
/// ModSecurity action form `id:<id>` (optionally `id:'<id>'`), bounded so
/// that `id:10` does not match `id:100` and `uuid:10` does not match at all.
pub fn references_rule_id(line: &str, id: &str) -> bool {
    IdMatcher::new(id).matches(line)
}

struct IdMatcher {
    quoted: String,
    action: Option<Regex>,
}

impl IdMatcher {
    fn new(id: &str) -> Self {
        let action = if id.is_empty() {
            None
        } else {
            Regex::new(&format!(
                r"(?:^|[^A-Za-z0-9_])id\s*:\s*'?{}(?:[^A-Za-z0-9_]|$)",
                regex::escape(id)
            ))
            .ok()
        };
        Self {
            quoted: format!("id \"{}\"", id),
            action,
        }
    }

    fn matches(&self, line: &str) -> bool {
        line.contains(&self.quoted) || self.action.as_ref().map_or(false, |re| re.is_match(line))
    }
}

/// Remove the rule block identified by `id` from `content`.
///
/// Lines are scanned in order. Any line referencing `id` starts skip
/// mode and is dropped, together with the agent's marker comment if that was
/// the line immediately before it. In skip mode every line is dropped until
/// one that starts (after leading whitespace) with `SecRule` or `#` and does
/// not contain `id`; that line ends skip mode and is kept. Lines outside skip
/// mode are always kept, so content with no matching line comes back
/// byte-for-byte identical.
///
/// The scan is textual: a block whose id sits on a continuation line, or a
/// block that mentions several ids, is not handled specially.
pub fn remove_rule_block(content: &str, id: &str) -> String {
    let matcher = IdMatcher::new(id);

    let mut kept: Vec<&str> = Vec::new();
    let mut skipping = false;
    let mut previous_kept_separator = false;

    for line in content.split('\n') {
        if matcher.matches(line) {
            if previous_kept_separator {
                kept.pop();
            }
            skipping = true;
            previous_kept_separator = false;
            continue;
        }

        if skipping {
            let trimmed = line.trim_start();
            let starts_next = trimmed.starts_with(RULE_START) || trimmed.starts_with(COMMENT_START);
            if starts_next && !line.contains(id) {
                skipping = false;
                kept.push(line);
                previous_kept_separator = line.trim() == SEPARATOR_COMMENT;
            }
            continue;
        }

        kept.push(line);
        previous_kept_separator = line.trim() == SEPARATOR_COMMENT;
    }

    kept.join("\n")
}
