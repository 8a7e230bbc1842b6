//! Spectral cache
//!
//! Keeps two collections:
//! - the *active* keys, `(id, name)` pairs currently requested for display,
//!   ordered by identifier
//! - *backing storage*, every entry parsed so far, living in a slot arena and
//!   addressed through generational [`EntryHandle`]s
//!
//! Removing an identifier only deactivates its key; the entry stays warm in
//! storage so re-adding it skips the loader. Storage is pruned lazily once it
//! grows past a soft capacity, and only entries that are not active are ever
//! evicted. Handles to evicted entries stop resolving instead of dangling.

mod entry;
mod sort;

pub use entry::{CacheEntry, CurveKind};
pub use sort::SortMode;

use crate::constants::cache::{CAPACITY_INCREMENT, DEFAULT_CAPACITY};
use crate::data::source::SpectrumLoader;
use serde::{Deserialize, Serialize};
use sort::{Row, sort_rows};
use std::collections::{BTreeMap, HashMap};

/// Generational reference to an entry in backing storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle {
    slot: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<CacheEntry>,
}

#[derive(Debug, Clone)]
struct ActiveKey {
    name: String,
    handle: EntryHandle,
}

/// One active spectrum in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotItem {
    pub id: String,
    pub name: String,
    pub handle: EntryHandle,
}

/// What a snapshot tells downstream consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// Membership or order may have changed; rebuild everything
    Sync,
    /// Same items in the same order; only their values changed
    Update,
}

/// Ordered view of the active entries
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub kind: SnapshotKind,
    pub items: Vec<SnapshotItem>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SnapshotItem> {
        self.items.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.id.as_str()).collect()
    }
}

/// Display defaults applied to entries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    pub visible_excitation: bool,
    pub visible_emission: bool,
    pub sort_mode: SortMode,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            visible_excitation: true,
            visible_emission: true,
            sort_mode: SortMode::default(),
        }
    }
}

/// Registry of loaded spectra keyed by identifier
pub struct Cache {
    loader: Box<dyn SpectrumLoader>,
    active: BTreeMap<String, ActiveKey>,
    storage: HashMap<String, EntryHandle>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    counter: u32,
    capacity: usize,
    capacity_increment: usize,
    settings: CacheSettings,
}

impl Cache {
    pub fn new(loader: impl SpectrumLoader + 'static) -> Self {
        Self::with_capacity(loader, DEFAULT_CAPACITY, CAPACITY_INCREMENT)
    }

    pub fn with_capacity(
        loader: impl SpectrumLoader + 'static,
        capacity: usize,
        capacity_increment: usize,
    ) -> Self {
        Self {
            loader: Box::new(loader),
            active: BTreeMap::new(),
            storage: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            counter: 0,
            capacity,
            capacity_increment: capacity_increment.max(1),
            settings: CacheSettings::default(),
        }
    }

    /// Swap the loader, dropping every active key and stored entry.
    pub fn replace_loader(&mut self, loader: impl SpectrumLoader + 'static) -> Snapshot {
        self.loader = Box::new(loader);
        self.active.clear();
        let handles: Vec<EntryHandle> = self.storage.drain().map(|(_, h)| h).collect();
        for handle in handles {
            self.release(handle);
        }
        self.counter = 0;
        self.sync()
    }

    pub fn settings(&self) -> CacheSettings {
        self.settings
    }

    /// Current soft capacity of backing storage
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of active keys
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of entries in backing storage (active or warm)
    pub fn stored_len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    pub fn is_stored(&self, id: &str) -> bool {
        self.storage.contains_key(id)
    }

    /// Activate `(id, name)` pairs.
    ///
    /// New keys get a contiguous block of indices in input order; keys that
    /// are already active are left alone. Storage is pruned afterwards if it
    /// exceeds the soft capacity.
    pub fn add<I, K, N>(&mut self, keys: I) -> Snapshot
    where
        I: IntoIterator<Item = (K, N)>,
        K: Into<String>,
        N: Into<String>,
    {
        let keys: Vec<(String, String)> = keys
            .into_iter()
            .map(|(id, name)| (id.into(), name.into()))
            .collect();
        let base = self.get_counter(u32::try_from(keys.len()).unwrap_or(u32::MAX));

        for (order, (id, name)) in keys.into_iter().enumerate() {
            if self.active.contains_key(&id) {
                continue;
            }
            let index = base.saturating_add(u32::try_from(order).unwrap_or(u32::MAX));
            let handle = self.get_data(&id, index);
            self.active.insert(id, ActiveKey { name, handle });
        }

        let snapshot = self.sync();
        if self.storage.len() > self.capacity {
            self.rebuild_cache();
        }
        snapshot
    }

    /// Deactivate identifiers. Unknown ones are ignored; entries stay in
    /// backing storage.
    pub fn remove<I, K>(&mut self, ids: I) -> Snapshot
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for id in ids {
            self.active.remove(id.as_ref());
        }
        self.sync()
    }

    /// Deactivate everything
    pub fn clear(&mut self) -> Snapshot {
        self.active.clear();
        self.sync()
    }

    /// Change display defaults and apply them to all active entries.
    ///
    /// Returns a [`SnapshotKind::Sync`] snapshot if the sort mode changed,
    /// otherwise an [`SnapshotKind::Update`].
    pub fn set_settings(
        &mut self,
        visible_excitation: bool,
        visible_emission: bool,
        sort_mode: SortMode,
    ) -> Snapshot {
        let resort = self.settings.sort_mode != sort_mode;
        self.settings = CacheSettings {
            visible_excitation,
            visible_emission,
            sort_mode,
        };

        let handles: Vec<EntryHandle> = self.active.values().map(|k| k.handle).collect();
        for handle in handles {
            if let Some(entry) = self.entry_mut(handle) {
                entry.set_visible_excitation(visible_excitation);
                entry.set_visible_emission(visible_emission);
            }
        }

        if resort { self.sync() } else { self.update() }
    }

    /// Active items ordered by the current sort mode
    pub fn snapshot(&self) -> Vec<SnapshotItem> {
        profiling::scope!("Cache::snapshot");

        let mut rows: Vec<Row<'_>> = self
            .active
            .iter()
            .filter_map(|(id, key)| {
                let entry = self.entry(key.handle);
                debug_assert!(entry.is_some(), "active key '{}' has no backing entry", id);
                entry.map(|entry| Row {
                    item: SnapshotItem {
                        id: id.clone(),
                        name: key.name.clone(),
                        handle: key.handle,
                    },
                    entry,
                })
            })
            .collect();
        sort_rows(&mut rows, self.settings.sort_mode);
        rows.into_iter().map(|r| r.item).collect()
    }

    /// Full re-derivation after membership or ordering changes
    pub fn sync(&self) -> Snapshot {
        Snapshot {
            kind: SnapshotKind::Sync,
            items: self.snapshot(),
        }
    }

    /// Same ordering, signalling that only entry values changed
    pub fn update(&self) -> Snapshot {
        Snapshot {
            kind: SnapshotKind::Update,
            items: self.snapshot(),
        }
    }

    /// Resolve a handle; `None` once the entry has been evicted
    pub fn entry(&self, handle: EntryHandle) -> Option<&CacheEntry> {
        self.slots
            .get(handle.slot as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.entry.as_ref())
    }

    pub fn entry_mut(&mut self, handle: EntryHandle) -> Option<&mut CacheEntry> {
        self.slots
            .get_mut(handle.slot as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.entry.as_mut())
    }

    /// Active entry for `id`
    pub fn get(&self, id: &str) -> Option<&CacheEntry> {
        let handle = self.active.get(id)?.handle;
        self.entry(handle)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut CacheEntry> {
        let handle = self.active.get(id)?.handle;
        self.entry_mut(handle)
    }

    /// Handle of the active entry for `id`
    pub fn handle(&self, id: &str) -> Option<EntryHandle> {
        self.active.get(id).map(|k| k.handle)
    }

    /// Clear the modified flag of every active entry; true if any was set.
    pub fn take_modified(&mut self) -> bool {
        let handles: Vec<EntryHandle> = self.active.values().map(|k| k.handle).collect();
        let mut modified = false;
        for handle in handles {
            if let Some(entry) = self.entry_mut(handle) {
                modified |= entry.take_modified();
            }
        }
        modified
    }

    /// Evict inactive entries from backing storage, or raise the soft
    /// capacity when every stored entry is active.
    pub fn rebuild_cache(&mut self) {
        profiling::scope!("Cache::rebuild_cache");

        let inactive: Vec<String> = self
            .storage
            .keys()
            .filter(|id| !self.active.contains_key(*id))
            .cloned()
            .collect();

        if inactive.is_empty() {
            self.capacity += self.capacity_increment;
            log::debug!("Cache full of active entries, capacity raised to {}", self.capacity);
            return;
        }

        for id in &inactive {
            if let Some(handle) = self.storage.remove(id) {
                self.release(handle);
            }
        }
        log::debug!(
            "Evicted {} inactive entries, {} remain",
            inactive.len(),
            self.storage.len()
        );
    }

    /// Reserve `n` consecutive indices and return the first.
    ///
    /// If the counter would overflow, active indices are compacted first.
    fn get_counter(&mut self, n: u32) -> u32 {
        if self.counter.checked_add(n).is_none() {
            self.rebuild_counter();
        }
        let base = self.counter;
        self.counter = self.counter.saturating_add(n);
        base
    }

    /// Reassign active indices to `0..len` keeping their relative order
    fn rebuild_counter(&mut self) {
        profiling::scope!("Cache::rebuild_counter");

        let mut handles: Vec<EntryHandle> = self.active.values().map(|k| k.handle).collect();
        handles.sort_by_key(|h| self.entry(*h).map_or(u32::MAX, CacheEntry::index));
        for (index, handle) in handles.iter().enumerate() {
            if let Some(entry) = self.entry_mut(*handle) {
                entry.set_index(index as u32);
            }
        }
        self.counter = handles.len() as u32;
        log::debug!("Index counter rebuilt, next index {}", self.counter);
    }

    /// Fetch `id` from storage or load it, assigning `index`.
    fn get_data(&mut self, id: &str, index: u32) -> EntryHandle {
        let settings = self.settings;

        if let Some(&handle) = self.storage.get(id) {
            if let Some(entry) = self.entry_mut(handle) {
                log::debug!("Cache hit for '{}'", id);
                entry.set_index(index);
                entry.set_visible_excitation(settings.visible_excitation);
                entry.set_visible_emission(settings.visible_emission);
                return handle;
            }
            debug_assert!(false, "storage key '{}' has no backing entry", id);
        }

        log::debug!("Cache miss for '{}'", id);
        let loaded = self.loader.load(id);
        let mut entry = CacheEntry::new(loaded.spectrum, index)
            .with_metadata(loaded.excitation_max, loaded.emission_max);
        entry.set_visible_excitation(settings.visible_excitation);
        entry.set_visible_emission(settings.visible_emission);
        entry.take_modified();

        let handle = self.insert(entry);
        self.storage.insert(id.to_string(), handle);
        handle
    }

    fn insert(&mut self, entry: CacheEntry) -> EntryHandle {
        if let Some(slot) = self.free.pop() {
            let s = &mut self.slots[slot as usize];
            s.entry = Some(entry);
            return EntryHandle {
                slot,
                generation: s.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        EntryHandle {
            slot: (self.slots.len() - 1) as u32,
            generation: 0,
        }
    }

    fn release(&mut self, handle: EntryHandle) {
        if let Some(slot) = self.slots.get_mut(handle.slot as usize) {
            if slot.generation == handle.generation && slot.entry.is_some() {
                slot.entry = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(handle.slot);
            }
        }
    }

    #[cfg(test)]
    fn set_counter(&mut self, counter: u32) {
        self.counter = counter;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::curve::Curve;
    use crate::data::source::LoadedSpectrum;
    use crate::data::spectrum::Spectrum;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Peaks (excitation, emission) per known id; counts loader calls
    fn counting_loader(loads: Rc<Cell<usize>>) -> impl SpectrumLoader + 'static {
        move |id: &str| {
            loads.set(loads.get() + 1);
            let peaks = match id {
                "A" | "alexa" => (495.0, 519.0),
                "B" | "bv421" => (405.0, 421.0),
                "C" | "cy5" => (649.0, 666.0),
                "fitc" => (495.0, 525.0),
                "pe" => (565.0, 578.0),
                _ => return LoadedSpectrum::unknown(id),
            };
            let curve =
                |p: f64| Curve::new(&[p - 10.0, p, p + 10.0], &[10.0, 100.0, 10.0]).unwrap();
            LoadedSpectrum::new(Spectrum::new(id, curve(peaks.0), curve(peaks.1)))
        }
    }

    fn cache() -> (Cache, Rc<Cell<usize>>) {
        let loads = Rc::new(Cell::new(0));
        (Cache::new(counting_loader(loads.clone())), loads)
    }

    fn keys(ids: &[&str]) -> Vec<(String, String)> {
        ids.iter().map(|id| (id.to_string(), id.to_string())).collect()
    }

    fn indices(cache: &Cache, ids: &[&str]) -> Vec<u32> {
        ids.iter().map(|id| cache.get(id).unwrap().index()).collect()
    }

    #[test]
    fn test_batch_gets_contiguous_indices() {
        let (mut cache, _) = cache();
        cache.add(keys(&["X"]));
        let snapshot = cache.add(keys(&["A", "B", "C"]));
        assert_eq!(snapshot.kind, SnapshotKind::Sync);

        let idx = indices(&cache, &["A", "B", "C"]);
        let k = idx[0];
        assert_eq!(idx, vec![k, k + 1, k + 2]);
        assert_eq!(snapshot.ids(), vec!["X", "A", "B", "C"]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let (mut cache, loads) = cache();
        let once = cache.add(keys(&["C", "A", "B"]));
        let twice = cache.add(keys(&["C", "A", "B"]));
        assert_eq!(once, twice);
        assert_eq!(cache.len(), 3);
        assert_eq!(loads.get(), 3);
    }

    #[test]
    fn test_readd_is_cache_hit() {
        let (mut cache, loads) = cache();
        cache.add(keys(&["X"]));
        let first = cache.handle("X").unwrap();
        let first_index = cache.get("X").unwrap().index();

        let snapshot = cache.remove(["X"]);
        assert!(snapshot.is_empty());
        assert!(!cache.is_active("X"));
        assert!(cache.is_stored("X"));
        // Handles stay valid while the entry is warm
        assert!(cache.entry(first).is_some());

        cache.add(keys(&["X"]));
        assert_eq!(loads.get(), 1);
        assert_eq!(cache.handle("X"), Some(first));
        assert!(cache.get("X").unwrap().index() > first_index);
    }

    #[test]
    fn test_hit_resets_visibility_to_defaults() {
        let (mut cache, _) = cache();
        cache.add(keys(&["A"]));
        cache.get_mut("A").unwrap().set_visible_emission(false);
        cache.remove(["A"]);
        cache.add(keys(&["A"]));
        assert!(cache.get("A").unwrap().visible_emission());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let (mut cache, _) = cache();
        cache.add(keys(&["A", "B"]));
        let snapshot = cache.remove(["nope"]);
        assert_eq!(snapshot.ids(), vec!["A", "B"]);
    }

    #[test]
    fn test_unknown_id_gives_invalid_entry() {
        let (mut cache, _) = cache();
        cache.add(keys(&["mystery"]));
        let entry = cache.get("mystery").unwrap();
        assert!(!entry.spectrum().is_valid());
    }

    #[test]
    fn test_sort_modes() {
        let (mut cache, _) = cache();
        cache.add(vec![("C", "Cy5"), ("A", "Alexa 488"), ("B", "BV421")]);

        let order = |cache: &mut Cache, mode| {
            cache.set_settings(true, true, mode);
            cache.snapshot().into_iter().map(|i| i.id).collect::<Vec<_>>()
        };

        assert_eq!(order(&mut cache, SortMode::Additive), ["C", "A", "B"]);
        assert_eq!(order(&mut cache, SortMode::AdditiveReversed), ["B", "A", "C"]);
        assert_eq!(order(&mut cache, SortMode::Alphabetical), ["A", "B", "C"]);
        assert_eq!(order(&mut cache, SortMode::AlphabeticalReversed), ["C", "B", "A"]);
        assert_eq!(order(&mut cache, SortMode::Excitation), ["B", "A", "C"]);
        assert_eq!(order(&mut cache, SortMode::ExcitationReversed), ["C", "A", "B"]);
        assert_eq!(order(&mut cache, SortMode::Emission), ["B", "A", "C"]);
        assert_eq!(order(&mut cache, SortMode::EmissionReversed), ["C", "A", "B"]);
    }

    #[test]
    fn test_equal_peaks_tie_break_by_name() {
        let (mut cache, _) = cache();
        // fitc and alexa share a 495 nm excitation peak; added in reverse name order
        cache.add(vec![("fitc", "FITC"), ("pe", "PE"), ("alexa", "Alexa 488")]);

        for mode in [SortMode::Excitation, SortMode::ExcitationReversed] {
            cache.set_settings(true, true, mode);
            let ids: Vec<String> = cache.snapshot().into_iter().map(|i| i.id).collect();
            let alexa = ids.iter().position(|id| id == "alexa").unwrap();
            let fitc = ids.iter().position(|id| id == "fitc").unwrap();
            assert!(alexa < fitc, "{:?}: {:?}", mode, ids);
        }

        cache.set_settings(true, true, SortMode::Emission);
        let ids: Vec<String> = cache.snapshot().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, ["alexa", "fitc", "pe"]);
    }

    #[test]
    fn test_counter_overflow_rebuilds_dense_indices() {
        let (mut cache, _) = cache();
        cache.add(keys(&["A", "B", "C"]));
        cache.remove(["B"]);
        cache.set_counter(u32::MAX - 1);

        cache.add(keys(&["X", "Y"]));
        assert_eq!(indices(&cache, &["A", "C", "X", "Y"]), vec![0, 1, 2, 3]);

        cache.set_settings(true, true, SortMode::Additive);
        let ids: Vec<String> = cache.snapshot().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, ["A", "C", "X", "Y"]);
    }

    #[test]
    fn test_capacity_raised_when_all_active() {
        let loads = Rc::new(Cell::new(0));
        let mut cache = Cache::with_capacity(counting_loader(loads), 2, 2);

        cache.add(keys(&["A", "B", "C"]));
        assert_eq!(cache.capacity(), 4);
        assert_eq!(cache.stored_len(), 3);

        // Inactive entries are kept until the next rebuild
        cache.remove(["A"]);
        cache.add(keys(&["X"]));
        assert_eq!(cache.stored_len(), 4);
        let stale = cache.handle("B").unwrap();

        cache.add(keys(&["Y"]));
        assert_eq!(cache.stored_len(), 4);
        assert!(!cache.is_stored("A"));
        for id in ["B", "C", "X", "Y"] {
            assert!(cache.is_active(id) && cache.is_stored(id), "{} evicted", id);
        }
        assert_eq!(cache.capacity(), 4);
        assert!(cache.entry(stale).is_some());
    }

    #[test]
    fn test_evicted_handles_stop_resolving() {
        let loads = Rc::new(Cell::new(0));
        let mut cache = Cache::with_capacity(counting_loader(loads.clone()), 1, 1);
        cache.add(keys(&["A"]));
        let old = cache.handle("A").unwrap();
        cache.remove(["A"]);
        cache.add(keys(&["B"]));

        assert!(!cache.is_stored("A"));
        assert!(cache.entry(old).is_none());

        // Slot reuse must not resurrect the old handle
        cache.add(keys(&["A"]));
        assert_eq!(loads.get(), 3);
        assert!(cache.entry(old).is_none());
        assert_ne!(cache.handle("A"), Some(old));
    }

    #[test]
    fn test_settings_snapshot_kinds() {
        let (mut cache, _) = cache();
        cache.add(keys(&["A", "B"]));
        assert!(!cache.take_modified());

        let snapshot = cache.set_settings(false, true, SortMode::Additive);
        assert_eq!(snapshot.kind, SnapshotKind::Update);
        assert!(!cache.get("A").unwrap().visible_excitation());
        assert!(cache.take_modified());

        // Same values again: nothing changes
        cache.set_settings(false, true, SortMode::Additive);
        assert!(!cache.take_modified());

        let snapshot = cache.set_settings(false, true, SortMode::Alphabetical);
        assert_eq!(snapshot.kind, SnapshotKind::Sync);

        // New entries pick up the current defaults
        cache.add(keys(&["C"]));
        assert!(!cache.get("C").unwrap().visible_excitation());
    }

    #[test]
    fn test_replace_loader_drops_everything() {
        let (mut cache, _) = cache();
        let old = {
            cache.add(keys(&["A"]));
            cache.handle("A").unwrap()
        };
        let snapshot = cache.replace_loader(|id: &str| LoadedSpectrum::unknown(id));
        assert!(snapshot.is_empty());
        assert_eq!(cache.stored_len(), 0);
        assert!(cache.entry(old).is_none());
    }
}
