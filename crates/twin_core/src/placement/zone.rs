//! Drop zones and pointer-to-zone resolution.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Share of the element height claimed by the top band.
pub const TOP_BAND_RATIO: f64 = 0.35;
/// Share of the element height claimed by the bottom band.
pub const BOTTOM_BAND_RATIO: f64 = 0.35;

/// Vertical band of a hovered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropZone {
    Top,
    Middle,
    Bottom,
}

impl DropZone {
    pub const ALL: [DropZone; 3] = [DropZone::Top, DropZone::Middle, DropZone::Bottom];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::Top => 0b001,
            Self::Middle => 0b010,
            Self::Bottom => 0b100,
        }
    }
}

impl Display for DropZone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vertical extent of the hovered element, in pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }
}

/// Maps a pointer position to the hovered element's drop zone.
///
/// With `y` relative to the element top: `y < 0.35h` is top, `y > 0.65h` is
/// bottom, everything else (boundaries included) is middle.
pub fn get_drop_zone(pointer_y: f64, bounds: &Bounds) -> DropZone {
    let y = pointer_y - bounds.top;
    let top_threshold = bounds.height * TOP_BAND_RATIO;
    let bottom_threshold = bounds.height * (1.0 - BOTTOM_BAND_RATIO);

    if y < top_threshold {
        DropZone::Top
    } else if y > bottom_threshold {
        DropZone::Bottom
    } else {
        DropZone::Middle
    }
}

/// Closed set of drop zones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ZoneSet(u8);

impl ZoneSet {
    pub const EMPTY: ZoneSet = ZoneSet(0);

    pub fn of(zones: &[DropZone]) -> Self {
        zones.iter().fold(Self::EMPTY, |set, zone| set.with(*zone))
    }

    pub fn with(self, zone: DropZone) -> Self {
        Self(self.0 | zone.bit())
    }

    pub fn contains(self, zone: DropZone) -> bool {
        self.0 & zone.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn zones(self) -> Vec<DropZone> {
        DropZone::ALL
            .into_iter()
            .filter(|zone| self.contains(*zone))
            .collect()
    }
}

/// Zones permitted for one (drag type, drop type) pair.
///
/// On the wire this is either the string `"any"` or a list of zone names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedZones {
    Any,
    Only(ZoneSet),
}

impl AllowedZones {
    pub fn only(zones: &[DropZone]) -> Self {
        Self::Only(ZoneSet::of(zones))
    }

    pub fn permits(self, zone: DropZone) -> bool {
        match self {
            Self::Any => true,
            Self::Only(set) => set.contains(zone),
        }
    }
}

const ANY_ZONE: &str = "any";

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AllowedZonesRepr {
    Keyword(String),
    Zones(Vec<DropZone>),
}

impl Serialize for AllowedZones {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            Self::Any => AllowedZonesRepr::Keyword(ANY_ZONE.to_string()),
            Self::Only(set) => AllowedZonesRepr::Zones(set.zones()),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AllowedZones {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match AllowedZonesRepr::deserialize(deserializer)? {
            AllowedZonesRepr::Keyword(value) if value == ANY_ZONE => Ok(Self::Any),
            AllowedZonesRepr::Keyword(value) => Err(de::Error::custom(format!(
                "unsupported zone keyword `{value}`; expected \"any\" or a zone list"
            ))),
            AllowedZonesRepr::Zones(zones) => Ok(Self::only(&zones)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{get_drop_zone, AllowedZones, Bounds, DropZone, ZoneSet};

    #[test]
    fn zones_split_at_35_and_65_percent() {
        let bounds = Bounds::new(100.0, 100.0);
        assert_eq!(get_drop_zone(100.0, &bounds), DropZone::Top);
        assert_eq!(get_drop_zone(134.9, &bounds), DropZone::Top);
        assert_eq!(get_drop_zone(135.0, &bounds), DropZone::Middle);
        assert_eq!(get_drop_zone(150.0, &bounds), DropZone::Middle);
        assert_eq!(get_drop_zone(165.0, &bounds), DropZone::Middle);
        assert_eq!(get_drop_zone(165.1, &bounds), DropZone::Bottom);
        assert_eq!(get_drop_zone(200.0, &bounds), DropZone::Bottom);
    }

    #[test]
    fn pointer_outside_element_clamps_to_outer_bands() {
        let bounds = Bounds::new(10.0, 20.0);
        assert_eq!(get_drop_zone(-50.0, &bounds), DropZone::Top);
        assert_eq!(get_drop_zone(500.0, &bounds), DropZone::Bottom);
    }

    #[test]
    fn zone_set_membership() {
        let set = ZoneSet::of(&[DropZone::Top, DropZone::Bottom]);
        assert!(set.contains(DropZone::Top));
        assert!(!set.contains(DropZone::Middle));
        assert!(set.contains(DropZone::Bottom));
        assert_eq!(set.zones(), vec![DropZone::Top, DropZone::Bottom]);
        assert!(ZoneSet::EMPTY.is_empty());
    }

    #[test]
    fn allowed_zones_wire_format() {
        let any: AllowedZones = serde_json::from_str(r#""any""#).unwrap();
        assert_eq!(any, AllowedZones::Any);

        let only: AllowedZones = serde_json::from_str(r#"["middle"]"#).unwrap();
        assert!(only.permits(DropZone::Middle));
        assert!(!only.permits(DropZone::Top));

        assert!(serde_json::from_str::<AllowedZones>(r#""all""#).is_err());
        assert_eq!(
            serde_json::to_string(&AllowedZones::only(&[DropZone::Bottom, DropZone::Top])).unwrap(),
            r#"["top","bottom"]"#
        );
    }
}
