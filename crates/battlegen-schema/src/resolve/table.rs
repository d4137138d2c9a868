use std::collections::BTreeMap;

///
/// FieldTable
///
/// Ordered field slots with tombstones. Every add appends a slot carrying
/// the next insertion index; a slot is never revived once tombstoned, so
/// indices are never reused.
///

#[derive(Debug, Default)]
pub(crate) struct FieldTable {
    slots: Vec<Slot>,
    live: BTreeMap<String, usize>,
    next_index: usize,
}

#[derive(Debug)]
struct Slot {
    name: String,
    index: usize,
    ty: String,
    removed: bool,
}

impl FieldTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a field under a fresh index, tombstoning any live slot of the
    /// same name.
    pub(crate) fn add(&mut self, name: &str, ty: &str) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        self.push(name, index, ty);

        index
    }

    /// Tombstone the live slot for `name`; unknown names are ignored.
    pub(crate) fn remove(&mut self, name: &str) -> bool {
        match self.live.remove(name) {
            Some(pos) => {
                self.slots[pos].removed = true;
                true
            }
            None => false,
        }
    }

    /// Replace the type of the live slot for `name`, keeping its index.
    /// Returns `false` when no such slot exists.
    pub(crate) fn change(&mut self, name: &str, ty: &str) -> bool {
        match self.live.get(name) {
            Some(&pos) => {
                self.slots[pos].ty = ty.to_string();
                true
            }
            None => false,
        }
    }

    /// Insert a live slot at an explicit index without consuming one.
    pub(crate) fn insert_at(&mut self, name: &str, index: usize, ty: &str) {
        self.push(name, index, ty);
    }

    /// Live slots as `(index, name, type)`, ascending by index. Equal
    /// indices keep slot creation order.
    pub(crate) fn into_ordered(self) -> Vec<(usize, String, String)> {
        let mut fields: Vec<_> = self
            .slots
            .into_iter()
            .filter(|slot| !slot.removed)
            .map(|slot| (slot.index, slot.name, slot.ty))
            .collect();
        fields.sort_by_key(|(index, _, _)| *index);

        fields
    }

    fn push(&mut self, name: &str, index: usize, ty: &str) {
        if let Some(pos) = self.live.remove(name) {
            self.slots[pos].removed = true;
        }

        self.live.insert(name.to_string(), self.slots.len());
        self.slots.push(Slot {
            name: name.to_string(),
            index,
            ty: ty.to_string(),
            removed: false,
        });
    }
}
