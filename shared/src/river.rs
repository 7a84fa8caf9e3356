use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Host serving the per-river GeoJSON files.
pub const CONTENT_HOST: &str = "d35i4h3qfw3o9a.cloudfront.net";

/// Characters left unescaped by ECMAScript `encodeURIComponent`.
/// Catalogue paths on the content host were produced with it, so the
/// escaping must match byte for byte.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_uri_component(segment: &str) -> String {
    utf8_percent_encode(segment, URI_COMPONENT).to_string()
}

/// The dataset the user has chosen in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectedRiver {
    pub category: String,
    pub prefecture: String,
    pub scale: String,
    pub river: String,
}

impl SelectedRiver {
    pub fn new(
        category: impl Into<String>,
        prefecture: impl Into<String>,
        scale: impl Into<String>,
        river: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            prefecture: prefecture.into(),
            scale: scale.into(),
            river: river.into(),
        }
    }

    /// Encoded `category/prefecture/scale/river`, unique per dataset.
    pub fn encoded_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            encode_uri_component(&self.category),
            encode_uri_component(&self.prefecture),
            encode_uri_component(&self.scale),
            encode_uri_component(&self.river),
        )
    }

    pub fn geojson_url(&self) -> String {
        format!("https://{CONTENT_HOST}/{}.geojson", self.encoded_path())
    }
}

/// Download URL for the current selection, if any.
pub fn geojson_url(selected: Option<&SelectedRiver>) -> Option<String> {
    selected.map(SelectedRiver::geojson_url)
}

/// A loaded river dataset, attached to every popup it produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RiverData {
    pub id: String,
    pub category: String,
    pub prefecture: String,
    pub scale: String,
    pub river: String,
    pub url: String,
}

impl RiverData {
    pub fn from_selection(selected: &SelectedRiver) -> Self {
        Self {
            id: selected.encoded_path(),
            category: selected.category.clone(),
            prefecture: selected.prefecture.clone(),
            scale: selected.scale.clone(),
            river: selected.river.clone(),
            url: selected.geojson_url(),
        }
    }

    pub fn selection(&self) -> SelectedRiver {
        SelectedRiver::new(
            self.category.clone(),
            self.prefecture.clone(),
            self.scale.clone(),
            self.river.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_escapes_slash_in_scale() {
        let selected = SelectedRiver::new("flood", "Tokyo", "1/50000", "Tama");
        assert_eq!(
            selected.geojson_url(),
            "https://d35i4h3qfw3o9a.cloudfront.net/flood/Tokyo/1%2F50000/Tama.geojson"
        );
    }

    #[test]
    fn url_encodes_utf8_with_uppercase_hex() {
        let selected = SelectedRiver::new("洪水", "東京都", "1/25000", "多摩川");
        assert_eq!(
            selected.geojson_url(),
            "https://d35i4h3qfw3o9a.cloudfront.net/%E6%B4%AA%E6%B0%B4/%E6%9D%B1%E4%BA%AC%E9%83%BD/1%2F25000/%E5%A4%9A%E6%91%A9%E5%B7%9D.geojson"
        );
    }

    #[test]
    fn encoding_matches_encode_uri_component() {
        assert_eq!(encode_uri_component("a-b_c.d!e~f*g'h(i)j"), "a-b_c.d!e~f*g'h(i)j");
        assert_eq!(encode_uri_component("a b"), "a%20b");
        assert_eq!(encode_uri_component("a+b&c=d?e#f"), "a%2Bb%26c%3Dd%3Fe%23f");
        assert_eq!(encode_uri_component("50%"), "50%25");
    }

    #[test]
    fn no_selection_has_no_url() {
        assert_eq!(geojson_url(None), None);
        let selected = SelectedRiver::new("a", "b", "c", "d");
        assert_eq!(
            geojson_url(Some(&selected)).as_deref(),
            Some("https://d35i4h3qfw3o9a.cloudfront.net/a/b/c/d.geojson")
        );
    }

    #[test]
    fn river_data_round_trips_selection() {
        let selected = SelectedRiver::new("flood", "Tokyo", "1/50000", "Tama");
        let data = RiverData::from_selection(&selected);
        assert_eq!(data.id, "flood/Tokyo/1%2F50000/Tama");
        assert_eq!(data.url, selected.geojson_url());
        assert_eq!(data.selection(), selected);
    }
}
