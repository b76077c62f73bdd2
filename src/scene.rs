use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;
use serde_json::from_str;
use std::error::Error;

static ROOM_DIR: Dir = include_dir!("src/rooms");

/// On-disk shape of an embedded room definition
#[derive(Deserialize, Clone, Debug)]
pub struct RoomDef {
    pub name: String,
    pub title: String,
    pub items: Vec<ItemDef>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ItemDef {
    pub id: String,
    pub label: String,
    pub hint: String,
    pub glyph: String,
}

/// One clickable target in the room.
///
/// Visibility is one-way within a round: a cleared item stays hidden until
/// the whole scene is reset.
#[derive(Clone, Debug)]
pub struct Item {
    pub id: String,
    pub label: String,
    pub hint: String,
    pub glyph: String,
    /// Layout offset in (columns, rows), drawn once at scene build time
    pub jitter: (i16, i16),
    visible: bool,
}

impl Item {
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// The ordered item list. The required click order *is* this order.
#[derive(Clone, Debug)]
pub struct Scene {
    name: String,
    title: String,
    items: Vec<Item>,
}

impl Scene {
    /// Load an embedded room by name. `seed` fixes the layout jitter so the
    /// scene renders identically for the whole round.
    pub fn load(room: &str, seed: u64) -> Result<Self, Box<dyn Error>> {
        let file = ROOM_DIR
            .get_file(format!("{room}.json"))
            .ok_or_else(|| {
                format!(
                    "unknown room '{}' (available: {})",
                    room,
                    available_rooms().join(", ")
                )
            })?;

        let contents = file.contents_utf8().ok_or("room file is not valid utf-8")?;
        let def: RoomDef = from_str(contents)?;

        Ok(Self::from_def(def, seed))
    }

    /// Build a scene from an in-memory definition (tests construct their own
    /// rooms this way).
    pub fn from_def(def: RoomDef, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let items = def
            .items
            .into_iter()
            .map(|d| Item {
                id: d.id,
                label: d.label,
                hint: d.hint,
                glyph: d.glyph,
                jitter: (rng.gen_range(-3i16..=3), rng.gen_range(-1i16..=1)),
                visible: true,
            })
            .collect();

        Self {
            name: def.name,
            title: def.title,
            items,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Item> {
        self.items.get(idx)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_visible(&self, idx: usize) -> bool {
        self.items.get(idx).is_some_and(|i| i.visible)
    }

    /// One-way within a round; out-of-range indices are ignored.
    pub fn hide(&mut self, idx: usize) {
        if let Some(item) = self.items.get_mut(idx) {
            item.visible = false;
        }
    }

    pub fn show_all(&mut self) {
        for item in &mut self.items {
            item.visible = true;
        }
    }
}

/// Names of all rooms embedded in the binary, sorted.
pub fn available_rooms() -> Vec<String> {
    ROOM_DIR
        .files()
        .filter_map(|f| f.path().file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .sorted()
        .collect()
}
