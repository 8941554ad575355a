//! Shell-style glob matching for listing filters.
//!
//! Implements the subset hide-glob patterns use:
//! - `*` matches zero or more characters
//! - `?` matches exactly one character
//! - `[abc]` matches any character in the set
//! - `[a-z]` matches any character in the range
//! - `[!abc]` or `[^abc]` matches any character NOT in the set
//!
//! Patterns match the entire name; there is no path awareness here, names
//! are matched one segment at a time.

/// Match a name against a glob pattern.
///
/// # Examples
/// ```
/// use duffel_core::glob::glob_match;
///
/// assert!(glob_match("*.pyc", "module.pyc"));
/// assert!(glob_match("*~", "draft.txt~"));
/// assert!(glob_match("data?", "data1"));
/// assert!(!glob_match("*.pyc", "module.py"));
/// ```
pub fn glob_match(pattern: &str, input: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let inp: Vec<char> = input.chars().collect();
    match_at(&pat, 0, &inp, 0)
}

fn match_at(pat: &[char], pi: usize, inp: &[char], ii: usize) -> bool {
    if pi == pat.len() {
        return ii == inp.len();
    }

    match pat[pi] {
        '*' => {
            // Try consuming zero or more input characters.
            let mut k = ii;
            loop {
                if match_at(pat, pi + 1, inp, k) {
                    return true;
                }
                if k == inp.len() {
                    return false;
                }
                k += 1;
            }
        }
        '?' => ii < inp.len() && match_at(pat, pi + 1, inp, ii + 1),
        '[' => match parse_class(pat, pi) {
            Some(class) => {
                ii < inp.len()
                    && class.matches(inp[ii])
                    && match_at(pat, class.end, inp, ii + 1)
            }
            // Unterminated class: treat '[' as a literal.
            None => ii < inp.len() && inp[ii] == '[' && match_at(pat, pi + 1, inp, ii + 1),
        },
        c => ii < inp.len() && inp[ii] == c && match_at(pat, pi + 1, inp, ii + 1),
    }
}

struct CharClass {
    negated: bool,
    singles: Vec<char>,
    ranges: Vec<(char, char)>,
    /// Pattern index one past the closing `]`.
    end: usize,
}

impl CharClass {
    fn matches(&self, c: char) -> bool {
        let hit = self.singles.contains(&c)
            || self.ranges.iter().any(|&(lo, hi)| c >= lo && c <= hi);
        hit != self.negated
    }
}

/// Parse a character class starting at `pat[start] == '['`.
fn parse_class(pat: &[char], start: usize) -> Option<CharClass> {
    let mut i = start + 1;
    let negated = matches!(pat.get(i), Some('!') | Some('^'));
    if negated {
        i += 1;
    }

    let mut singles = Vec::new();
    let mut ranges = Vec::new();
    let mut first = true;

    while i < pat.len() {
        let c = pat[i];
        if c == ']' && !first {
            return Some(CharClass {
                negated,
                singles,
                ranges,
                end: i + 1,
            });
        }
        first = false;

        if i + 2 < pat.len() && pat[i + 1] == '-' && pat[i + 2] != ']' {
            ranges.push((c, pat[i + 2]));
            i += 3;
        } else {
            singles.push(c);
            i += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        assert!(glob_match("exact.txt", "exact.txt"));
        assert!(!glob_match("exact.txt", "other.txt"));
    }

    #[test]
    fn test_star() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("*", ""));
        assert!(glob_match("*.pyc", "cache.pyc"));
        assert!(glob_match("*~", "notes.md~"));
        assert!(!glob_match("*.pyc", "cache.py"));
    }

    #[test]
    fn test_question_mark() {
        assert!(glob_match("data?", "data1"));
        assert!(!glob_match("data?", "data"));
        assert!(!glob_match("data?", "data12"));
    }

    #[test]
    fn test_character_class() {
        assert!(glob_match("[abc]", "b"));
        assert!(!glob_match("[abc]", "d"));
        assert!(glob_match("[a-z]x", "mx"));
        assert!(glob_match("[!abc]", "d"));
        assert!(glob_match("[^abc]", "d"));
        assert!(!glob_match("[!abc]", "a"));
    }

    #[test]
    fn test_unterminated_class_is_literal() {
        assert!(glob_match("[ab", "[ab"));
        assert!(!glob_match("[ab", "a"));
    }

    #[test]
    fn test_hidden_defaults_shapes() {
        assert!(glob_match("__pycache__", "__pycache__"));
        assert!(glob_match(".DS_Store", ".DS_Store"));
        assert!(!glob_match("__pycache__", "pycache"));
    }
}
