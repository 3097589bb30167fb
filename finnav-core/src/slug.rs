/// Anchor id for a section label, e.g. `"Fees & Expenses"` becomes
/// `"fees-and-expenses"`.
///
/// Content fragments carry anchors produced by this same function, so the
/// mapping has to stay stable.
pub fn section_anchor(label: &str) -> String {
    let lowered = label.to_lowercase().replace('&', "and");
    let mut slug = String::with_capacity(lowered.len());
    let mut in_gap = false;
    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            in_gap = false;
        } else if !in_gap {
            slug.push('-');
            in_gap = true;
        }
    }
    // A run of separators collapses to one hyphen, so at most one sits at
    // either end.
    let slug = slug.strip_prefix('-').unwrap_or(&slug);
    let slug = slug.strip_suffix('-').unwrap_or(slug);
    slug.to_string()
}
