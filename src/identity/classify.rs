//! Role classification.

use crate::core::{RoleClass, RoleMarker};
use std::collections::BTreeSet;

/// Order in which markers are checked. First match wins.
///
/// Member is checked before moderator, so an author carrying both markers
/// is presented as a member.
const PRECEDENCE: [(RoleMarker, RoleClass); 2] = [
    (RoleMarker::Member, RoleClass::Member),
    (RoleMarker::Moderator, RoleClass::Moderator),
];

/// Maps an author's role markers to a presentation role.
///
/// Markers with no presentation role (owner, verified, unknown) are ignored.
///
/// # Examples
///
/// ```
/// use chat_overlay::core::{RoleClass, RoleMarker};
/// use chat_overlay::identity::classify;
/// use std::collections::BTreeSet;
///
/// let markers: BTreeSet<_> = [RoleMarker::Moderator].into_iter().collect();
/// assert_eq!(classify(&markers), RoleClass::Moderator);
/// assert_eq!(classify(&BTreeSet::new()), RoleClass::None);
/// ```
#[must_use]
pub fn classify(markers: &BTreeSet<RoleMarker>) -> RoleClass {
    PRECEDENCE
        .iter()
        .find(|(marker, _)| markers.contains(marker))
        .map_or(RoleClass::None, |&(_, class)| class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn set(markers: &[RoleMarker]) -> BTreeSet<RoleMarker> {
        markers.iter().copied().collect()
    }

    #[test_case(&[] => RoleClass::None; "no markers")]
    #[test_case(&[RoleMarker::Member] => RoleClass::Member; "member")]
    #[test_case(&[RoleMarker::Moderator] => RoleClass::Moderator; "moderator")]
    #[test_case(&[RoleMarker::Member, RoleMarker::Moderator] => RoleClass::Member; "member wins over moderator")]
    #[test_case(&[RoleMarker::Owner, RoleMarker::Verified] => RoleClass::None; "unmapped markers")]
    #[test_case(&[RoleMarker::Unknown, RoleMarker::Moderator] => RoleClass::Moderator; "unknown ignored")]
    fn test_classify(markers: &[RoleMarker]) -> RoleClass {
        classify(&set(markers))
    }
}
