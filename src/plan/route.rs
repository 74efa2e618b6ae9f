//! Route matching for dependency derivation.

/// Whether a navigation `target` lands on a screen declared at `route`.
///
/// Query strings, fragments and trailing slashes are ignored. Segments are
/// compared one by one; a parameter segment (`:id`, `{id}`, `[id]`) on
/// either side matches any concrete segment.
pub fn route_matches(route: &str, target: &str) -> bool {
    let route = segments(route);
    let target = segments(target);
    route.len() == target.len()
        && route
            .iter()
            .zip(&target)
            .all(|(r, t)| r == t || is_param(r) || is_param(t))
}

fn segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn is_param(segment: &str) -> bool {
    segment.starts_with(':')
        || (segment.starts_with('{') && segment.ends_with('}'))
        || (segment.starts_with('[') && segment.ends_with(']'))
}
