use std::collections::HashMap;
use std::fmt::Write;

use pulse_core::DomainSummary;

const TOP_SITES: usize = 5;

/// `65` -> `01m 05s`, `3700` -> `1h 01m 40s`.
pub fn format_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m {secs:02}s")
    } else {
        format!("{minutes:02}m {secs:02}s")
    }
}

/// Renders the locally accumulated totals plus the busiest sites, the way
/// the extension popup summarizes them.
pub fn render(table: &HashMap<String, DomainSummary>) -> String {
    let mut productive = 0;
    let mut unproductive = 0;
    let mut total = 0;
    for site in table.values() {
        productive += site.productive;
        unproductive += site.unproductive;
        total += site.total;
    }

    let mut sites: Vec<&DomainSummary> = table.values().collect();
    sites.sort_by(|a, b| b.total.cmp(&a.total));

    let mut out = String::new();
    let _ = writeln!(out, "productive   {}", format_time(productive));
    let _ = writeln!(out, "unproductive {}", format_time(unproductive));
    let _ = writeln!(out, "total        {}", format_time(total));
    if !sites.is_empty() {
        let _ = writeln!(out);
        for site in sites.iter().take(TOP_SITES) {
            let _ = writeln!(
                out,
                "{:<28} {:<12} {}",
                site.domain,
                site.category.as_str(),
                format_time(site.total)
            );
        }
    }
    out
}
