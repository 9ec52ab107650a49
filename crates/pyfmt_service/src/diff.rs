//! Minimal unified-diff rendering for `--diff` mode. The output is a single
//! hunk covering the changed span, which is all the callers need to decide
//! whether (and where) a file would change.

/// Render a unified diff between the original and formatted text, or an
/// empty string when they are identical.
pub fn unified_diff(original: &str, formatted: &str, path: &str) -> String {
    if original == formatted {
        return String::new();
    }
    let old_lines: Vec<&str> = original.lines().collect();
    let new_lines: Vec<&str> = formatted.lines().collect();

    let mut prefix = 0;
    while prefix < old_lines.len()
        && prefix < new_lines.len()
        && old_lines[prefix] == new_lines[prefix]
    {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < old_lines.len() - prefix
        && suffix < new_lines.len() - prefix
        && old_lines[old_lines.len() - 1 - suffix] == new_lines[new_lines.len() - 1 - suffix]
    {
        suffix += 1;
    }

    let removed = &old_lines[prefix..old_lines.len() - suffix];
    let added = &new_lines[prefix..new_lines.len() - suffix];

    let mut out = String::new();
    out.push_str(&format!("--- {path} (original)\n"));
    out.push_str(&format!("+++ {path} (reformatted)\n"));
    out.push_str(&format!(
        "@@ -{},{} +{},{} @@\n",
        prefix + 1,
        removed.len(),
        prefix + 1,
        added.len()
    ));
    for line in removed {
        out.push('-');
        out.push_str(line);
        out.push('\n');
    }
    for line in added {
        out.push('+');
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs_produce_no_diff() {
        assert_eq!(unified_diff("a\nb\n", "a\nb\n", "x.py"), "");
    }

    #[test]
    fn changed_middle_line() {
        let diff = unified_diff("a\nb\nc\n", "a\nB\nc\n", "x.py");
        assert!(diff.contains("@@ -2,1 +2,1 @@"));
        assert!(diff.contains("-b\n"));
        assert!(diff.contains("+B\n"));
    }

    #[test]
    fn inserted_lines() {
        let diff = unified_diff("a\nb\n", "a\nx\ny\nb\n", "x.py");
        assert!(diff.contains("@@ -2,0 +2,2 @@"));
        assert!(diff.contains("+x\n+y\n"));
    }
}
