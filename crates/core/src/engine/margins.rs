use crate::domain::margin::{MarginOverride, MarginSet};

/// The one place margin data is interpreted.
///
/// `None` yields the global defaults. An override in either encoding is read field by
/// field; missing fields take the matching global default. Every field is clamped to
/// `[0, 100]` after resolution.
pub fn resolve_margins(margin_override: Option<&MarginOverride>, defaults: &MarginSet) -> MarginSet {
    let Some(margin_override) = margin_override else {
        return defaults.clamped();
    };

    let (part, labor, extra) = margin_override.fields();
    MarginSet::new(
        part.unwrap_or(defaults.part_margin),
        labor.unwrap_or(defaults.labor_margin),
        extra.unwrap_or(defaults.extra_margin),
    )
}
