use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Ids of the river layers currently drawn on the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibleLayers {
    ids: BTreeSet<String>,
}

impl VisibleLayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns whether the layer is visible afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_owned());
            true
        }
    }

    /// Make `id` visible without toggling. Returns `true` if it was hidden.
    pub fn show(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_owned())
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

impl<S: Into<String>> FromIterator<S> for VisibleLayers {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
