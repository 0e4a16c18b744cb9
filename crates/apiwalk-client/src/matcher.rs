//! Navigation chain → path template.

use apiwalk_types::ResolveError;

use crate::spec::{PathTemplate, Segment, Specification};

/// Positional match: equal length, literals equal, parameters match anything.
pub(crate) fn segments_match(segments: &[Segment], chain: &[String]) -> bool {
    segments.len() == chain.len()
        && segments.iter().zip(chain).all(|(segment, actual)| match segment {
            Segment::Literal(literal) => literal == actual,
            Segment::Param { .. } => true,
        })
}

/// Finds the first template, in declaration order, that matches `chain`.
///
/// When a literal template and a parameterized one of the same length both
/// match, whichever the document declares first wins.
pub fn find_template<'a>(
    spec: &'a Specification,
    chain: &[String],
) -> Result<&'a PathTemplate, ResolveError> {
    spec.templates()
        .iter()
        .find(|template| segments_match(template.segments(), chain))
        .ok_or_else(|| ResolveError::UnresolvedEndpoint { chain: chain.to_vec() })
}
