use gloo::storage::{LocalStorage, Storage};
use gridplay_core::{Snapshot, SnapshotStore};
use std::marker::PhantomData;

pub(crate) const MINESWEEPER_KEY: &str = "gridplay:minesweeper:v1";
pub(crate) const CROSSWORD_KEY: &str = "gridplay:crossword:v1";
pub(crate) const CROSSWORD_PLAY_KEY: &str = "gridplay:crossword-play:v1";

/// Keeps a tool's exported snapshot in `localStorage` under its own key.
#[derive(Debug)]
pub(crate) struct LocalSnapshotStore<T> {
    key: &'static str,
    _item: PhantomData<T>,
}

impl<T> LocalSnapshotStore<T> {
    pub(crate) const fn new(key: &'static str) -> Self {
        Self {
            key,
            _item: PhantomData,
        }
    }
}

impl<T: Snapshot> SnapshotStore for LocalSnapshotStore<T> {
    type Item = T;

    fn load(&self) -> Option<T> {
        let data: String = LocalStorage::get(self.key).ok()?;
        T::import(&data)
            .inspect_err(|err| log::warn!("Discarding {}: {}", self.key, err))
            .ok()
    }

    fn save(&mut self, item: &T) {
        let result = item
            .export()
            .map_err(|err| err.to_string())
            .and_then(|data| LocalStorage::set(self.key, data).map_err(|err| err.to_string()));
        if let Err(err) = result {
            log::warn!("Could not save {}: {}", self.key, err);
        }
    }

    fn clear(&mut self) {
        LocalStorage::delete(self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tools_do_not_share_a_storage_key() {
        let keys = [MINESWEEPER_KEY, CROSSWORD_KEY, CROSSWORD_PLAY_KEY];
        for (i, key) in keys.iter().enumerate() {
            assert!(key.starts_with("gridplay:"));
            assert!(keys[i + 1..].iter().all(|other| other != key));
        }
    }
}
