//! `scopemap init` - write a usage section into a CLAUDE.md file.
//!
//! The section is wrapped in sentinel comments so repeat runs update it in
//! place without disturbing surrounding content.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

const SENTINEL_START: &str = "<!-- scopemap:start -->";
const SENTINEL_END: &str = "<!-- scopemap:end -->";

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Print what would be written without modifying the file
    #[arg(long)]
    dry_run: bool,

    /// Path to the CLAUDE.md file
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,
}

pub fn run(args: &InitArgs) -> Result<()> {
    let section = generate_section();

    // --dry-run with no path: just print the section itself.
    if args.dry_run && args.path.is_none() {
        println!("{}", section);
        return Ok(());
    }

    let path = args
        .path
        .clone()
        .unwrap_or_else(|| PathBuf::from("CLAUDE.md"));

    let existing = fs::read_to_string(&path).ok();
    let updated = apply_section(existing.as_deref().unwrap_or(""), &section);

    if args.dry_run {
        print!("{}", updated);
        return Ok(());
    }

    if existing.as_deref() == Some(updated.as_str()) {
        eprintln!("{} is already up to date", path.display());
        return Ok(());
    }

    fs::write(&path, &updated).with_context(|| format!("writing {}", path.display()))?;

    if existing.is_none() {
        eprintln!("created {}", path.display());
    } else {
        eprintln!("updated {}", path.display());
    }
    Ok(())
}

/// The full sentinel-wrapped documentation block.
fn generate_section() -> String {
    let body = "\
## scopemap — Repository Map

Run `scopemap` via the Bash tool at the start of any task. It produces a
ranked map of files, symbols, and dependencies that replaces broad initial
exploration.

**Run it:**
```bash
scopemap                            # current directory, all languages
scopemap /path/to/repo              # explicit path
scopemap -l go,python               # filter by language
scopemap -n 20                      # limit to top 20 files (large repos)

scopemap --symbol BuildGraph        # focused: symbol + its callers/callees
scopemap --file internal/auth       # focused: symbols and deps for a path
scopemap --symbol Handle --file server   # combine filters (AND)
```

**How to use the output:**

1. **Read files in ranked order.** The `files` table is sorted by PageRank
   (most central first). Start from the top, not from directory listings.

2. **Use `symbols` instead of grep to find definitions.** It lists every
   exported definition with file and line number.

3. **Use `dependencies` to trace call chains** before reading a file to
   understand what it imports.

4. **Use `--symbol` when you know the name.** One run returns the
   definition, callers, callees, and relevant files — faster and more
   complete than searching.

5. **Use `--file` when focused on a subsystem** to see its symbols and
   dependencies without full-map noise.

**All flags:** `scopemap --help`";

    format!("{}\n{}\n{}", SENTINEL_START, body, SENTINEL_END)
}

/// Insert `section` into `content`, replacing an existing sentinel block
/// or appending when none is present.
fn apply_section(content: &str, section: &str) -> String {
    if let (Some(start), Some(end)) = (content.find(SENTINEL_START), content.find(SENTINEL_END)) {
        if end > start {
            return format!(
                "{}{}{}",
                &content[..start],
                section,
                &content[end + SENTINEL_END.len()..]
            );
        }
    }

    let mut out = content.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(section);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_to_empty_content() {
        let got = apply_section("", "<!-- scopemap:start -->\nX\n<!-- scopemap:end -->");
        assert!(got.contains("scopemap:start"));
        assert!(got.ends_with("<!-- scopemap:end -->\n"));
    }

    #[test]
    fn appends_after_existing_content() {
        let got = apply_section("# My Project\n", &generate_section());
        assert!(got.starts_with("# My Project\n\n<!-- scopemap:start -->"));
    }

    #[test]
    fn adds_missing_trailing_newline() {
        let got = apply_section("no newline", &generate_section());
        assert!(got.starts_with("no newline\n\n<!-- scopemap:start -->"));
    }

    #[test]
    fn replaces_existing_block_in_place() {
        let old = format!(
            "# Before\n\n{}\nold body\n{}\n\n# After\n",
            SENTINEL_START, SENTINEL_END
        );
        let got = apply_section(&old, &generate_section());
        assert!(got.starts_with("# Before\n\n<!-- scopemap:start -->"));
        assert!(got.ends_with("\n\n# After\n"));
        assert!(!got.contains("old body"));
        // Still exactly one block.
        assert_eq!(got.matches(SENTINEL_START).count(), 1);
    }

    #[test]
    fn repeated_application_is_stable() {
        let once = apply_section("# Doc\n", &generate_section());
        let twice = apply_section(&once, &generate_section());
        assert_eq!(once, twice);
    }

    #[test]
    fn section_mentions_focused_queries() {
        let section = generate_section();
        assert!(section.contains("--symbol"));
        assert!(section.contains("--file"));
    }
}
