//! Content negotiation between the JSON response and GraphiQL.
//!
//! Candidates are ranked like HTTP `Accept` negotiation usually is: by quality, then by how
//! specific the matching media range is, then by the position of that range in the header and
//! finally by candidate order. JSON is the first candidate, so it wins every tie.

use std::cmp::Ordering;

use mediatype::{MediaType, MediaTypeList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    Json,
    Html,
}

impl Candidate {
    const ALL: [Candidate; 2] = [Candidate::Json, Candidate::Html];

    fn essence(self) -> (&'static str, &'static str) {
        match self {
            Candidate::Json => ("application", "json"),
            Candidate::Html => ("text", "html"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Priority {
    quality: f32,
    specificity: u8,
    order: usize,
}

/// Whether GraphiQL may be served: enabled in the options, no `raw` parameter anywhere in the
/// request and an `Accept` header preferring HTML over JSON.
pub fn can_display_graphiql(graphiql: bool, raw: bool, accept: Option<&str>) -> bool {
    graphiql && !raw && prefers_html(accept)
}

/// Whether the `Accept` header ranks `text/html` strictly above `application/json`.
pub fn prefers_html(accept: Option<&str>) -> bool {
    preferred(accept) == Some(Candidate::Html)
}

fn preferred(accept: Option<&str>) -> Option<Candidate> {
    let Some(accept) = accept else {
        return Some(Candidate::Json);
    };

    let ranges = MediaTypeList::new(accept)
        .filter_map(Result::ok)
        .collect::<Vec<_>>();

    Candidate::ALL
        .into_iter()
        .enumerate()
        .filter_map(|(index, candidate)| {
            let priority = ranges
                .iter()
                .enumerate()
                .filter_map(|(order, range)| specify(candidate, range, order))
                .fold(None, |best: Option<Priority>, priority| match best {
                    Some(best)
                        if (best.specificity, best.quality, best.order)
                            >= (priority.specificity, priority.quality, priority.order) =>
                    {
                        Some(best)
                    }
                    _ => Some(priority),
                })?;
            (priority.quality > 0.0).then_some((index, candidate, priority))
        })
        .min_by(|(a_index, _, a), (b_index, _, b)| {
            b.quality
                .partial_cmp(&a.quality)
                .unwrap_or(Ordering::Equal)
                .then(b.specificity.cmp(&a.specificity))
                .then(a.order.cmp(&b.order))
                .then(a_index.cmp(b_index))
        })
        .map(|(_, candidate, _)| candidate)
}

fn specify(candidate: Candidate, range: &MediaType<'_>, order: usize) -> Option<Priority> {
    let (ty, subty) = candidate.essence();
    let mut specificity = 0;

    if range.ty.as_str().eq_ignore_ascii_case(ty) {
        specificity |= 4;
    } else if range.ty.as_str() != "*" {
        return None;
    }

    if range.subty.as_str().eq_ignore_ascii_case(subty) {
        specificity |= 2;
    } else if range.subty.as_str() != "*" {
        return None;
    }

    let mut quality = 1.0;
    let mut has_params = false;
    for (name, value) in range.params.iter() {
        let value = value.as_str().trim_matches('"');
        if name.as_str().eq_ignore_ascii_case("q") {
            // An unreadable quality rules the range out.
            quality = value.parse::<f32>().ok().filter(|quality| quality.is_finite())?;
        } else if value == "*" {
            has_params = true;
        } else {
            // Our candidates carry no parameters, so any concrete one rules the range out.
            return None;
        }
    }

    if has_params {
        specificity |= 1;
    }

    Some(Priority {
        quality,
        specificity,
        order,
    })
}
