// src/utils/progress.rs

//! Progress reporting helpers on top of the `log` facade.
//!
//! Output format and level filtering belong to whatever logger the binary
//! installs; these helpers only shape the messages.

/// Width of separator and header borders.
const RULE_WIDTH: usize = 60;

/// Log a separator line
pub fn separator() {
    log::info!("{}", "─".repeat(RULE_WIDTH));
}

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(RULE_WIDTH);
    log::info!("{}", border);
    log::info!("  {}", title);
    log::info!("{}", border);
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    log::info!("{}", format_step(step_num, total, message));
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    log::info!("    ↳ {}", message);
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("[SUMMARY] {}", title);
    for (key, value) in items {
        log::info!("    {}: {}", key, value);
    }
}

fn format_step(step_num: usize, total: usize, message: &str) -> String {
    format!("[STEP {}/{}] {}", step_num, total, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_step() {
        assert_eq!(format_step(2, 5, "Fetch details"), "[STEP 2/5] Fetch details");
    }
}
