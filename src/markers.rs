//! Map marker placement for the events page.

use serde::Serialize;

use crate::{
    filter::FilterSpec,
    record::Item,
    render::{escape_html, format_date},
};

pub const OVERVIEW_ZOOM: u8 = 11;
pub const FOCUS_ZOOM: u8 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Central Goa.
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 15.3850,
    lng: 74.0000,
};

/// Known event towns, keyed by lowercase location.
const PLACES: [(&str, &str, LatLng); 4] = [
    ("panjim", "Panjim", LatLng { lat: 15.4909, lng: 73.8278 }),
    ("margao", "Margao", LatLng { lat: 15.2736, lng: 73.9589 }),
    ("vasco", "Vasco", LatLng { lat: 15.3866, lng: 73.8154 }),
    ("mapusa", "Mapusa", LatLng { lat: 15.6029, lng: 73.8213 }),
];

pub fn coordinates(location: &str) -> Option<LatLng> {
    let key = location.trim().to_lowercase();
    PLACES.iter().find(|(k, _, _)| *k == key).map(|(_, _, c)| *c)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Lowercase location, matches category filter tokens.
    pub key: String,
    pub title: String,
    pub position: LatLng,
    pub popup_html: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub center: LatLng,
    pub zoom: u8,
}

/// One marker per known location, taken from the first item seen there.
/// Items in unknown places get no marker.
pub fn place_markers(items: &[Item]) -> Vec<Marker> {
    let mut markers: Vec<Marker> = Vec::new();
    for item in items {
        let key = item.location.trim().to_lowercase();
        let Some(position) = coordinates(&key) else {
            continue;
        };
        if markers.iter().any(|m| m.key == key) {
            continue;
        }
        markers.push(Marker {
            popup_html: format!(
                "<div class=\"marker-popup\"><h4>{}</h4><p><strong>Venue:</strong> {}</p><p><strong>Date:</strong> {}</p></div>",
                escape_html(&item.title),
                escape_html(&item.venue),
                escape_html(&format_date(&item.date)),
            ),
            title: item.title.clone(),
            key,
            position,
        });
    }
    markers
}

/// Where to point the map for the active filter: close in on a category chip,
/// the whole region otherwise.
pub fn camera_for(spec: &FilterSpec) -> Camera {
    match spec {
        FilterSpec::Category(location) => Camera {
            center: coordinates(location).unwrap_or(DEFAULT_CENTER),
            zoom: FOCUS_ZOOM,
        },
        _ => Camera {
            center: DEFAULT_CENTER,
            zoom: OVERVIEW_ZOOM,
        },
    }
}

/// The marker whose popup should open for the active filter, if any.
pub fn focused<'a>(markers: &'a [Marker], spec: &FilterSpec) -> Option<&'a Marker> {
    match spec {
        FilterSpec::Category(location) => {
            let key = location.trim().to_lowercase();
            markers.iter().find(|m| m.key == key)
        }
        _ => None,
    }
}
