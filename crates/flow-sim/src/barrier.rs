//! User-placed barriers.

use flow_core::{BarrierId, Coordinate, EdgeId};

/// A barrier placed at a click location.
///
/// `edge` is the edge it blocks; `None` marks a free-floating barrier whose
/// click matched no edge within the snap distance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Barrier {
    pub id:      BarrierId,
    /// Where the user clicked.
    pub click:   Coordinate,
    /// Closest point on the blocked edge, if matched.
    pub snapped: Option<Coordinate>,
    pub edge:    Option<EdgeId>,
}

impl Barrier {
    /// Marker position: the snapped point, else the raw click.
    pub fn pos(&self) -> Coordinate {
        self.snapped.unwrap_or(self.click)
    }

    pub fn is_free_floating(&self) -> bool {
        self.edge.is_none()
    }
}
