//! # Settings storage
//!
//! Non-volatile storage is an external collaborator. The UI hands it a fixed size byte image and a version token, the
//! token changes on every save so that wear leveling implementations can rotate through their slots and find the
//! newest image on load.

use heapless::Vec;

/// Errors that can occur while loading or saving settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Nothing has been saved yet, or the stored image is unreadable
    NotFound,
    /// The stored image does not have the requested size
    SizeMismatch,
    /// The image does not fit in the storage slot
    Full,
}

/// Non-volatile storage for the settings image is represented here
pub trait Storage {
    /// `s.load(buf, v)` fills `buf` with the newest stored image and sets `v` to its version token
    ///
    /// On error `buf` must be left untouched.
    fn load(&mut self, buf: &mut [u8], version: &mut u16) -> Result<(), StorageError>;

    /// `s.save(buf, v)` stores the image `buf`, advancing the version token `v`
    fn save(&mut self, buf: &[u8], version: &mut u16) -> Result<(), StorageError>;
}

/// RAM backed storage rotating through `NUM_SLOTS` slots, for simulation and tests
///
/// Each save goes to the slot after the previous one, load picks the slot with the newest version.
pub struct MemoryStorage<const NUM_SLOTS: usize> {
    slots: [Option<Slot>; NUM_SLOTS],
    next_slot: usize,
    num_saves: u32,
}

#[derive(Clone)]
struct Slot {
    version: u16,
    image: Vec<u8, SLOT_CAPACITY>,
}

impl<const NUM_SLOTS: usize> MemoryStorage<NUM_SLOTS> {
    /// `MemoryStorage::new()` is a new storage with nothing saved in it
    pub fn new() -> Self {
        const EMPTY: Option<Slot> = None;
        Self {
            slots: [EMPTY; NUM_SLOTS],
            next_slot: 0,
            num_saves: 0,
        }
    }

    /// `ms.num_saves()` is the number of successful saves so far
    pub fn num_saves(&self) -> u32 {
        self.num_saves
    }

    /// `ms.newest()` is the slot holding the newest image, comparing versions with wraparound
    fn newest(&self) -> Option<&Slot> {
        self.slots.iter().flatten().fold(None, |best: Option<&Slot>, slot| match best {
            Some(b) if (slot.version.wrapping_sub(b.version) as i16) <= 0 => Some(b),
            _ => Some(slot),
        })
    }
}

impl<const NUM_SLOTS: usize> Default for MemoryStorage<NUM_SLOTS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const NUM_SLOTS: usize> Storage for MemoryStorage<NUM_SLOTS> {
    fn load(&mut self, buf: &mut [u8], version: &mut u16) -> Result<(), StorageError> {
        let slot = self.newest().ok_or(StorageError::NotFound)?;
        if slot.image.len() != buf.len() {
            return Err(StorageError::SizeMismatch);
        }
        buf.copy_from_slice(&slot.image);
        *version = slot.version;
        Ok(())
    }

    fn save(&mut self, buf: &[u8], version: &mut u16) -> Result<(), StorageError> {
        if NUM_SLOTS == 0 {
            return Err(StorageError::Full);
        }
        let image = Vec::from_slice(buf).map_err(|_| StorageError::Full)?;

        *version = version.wrapping_add(1);
        self.slots[self.next_slot] = Some(Slot {
            version: *version,
            image,
        });
        self.next_slot = (self.next_slot + 1) % NUM_SLOTS;
        self.num_saves += 1;
        Ok(())
    }
}

/// The largest image a memory storage slot can hold
pub const SLOT_CAPACITY: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_storage_fails_to_load() {
        let mut ms = MemoryStorage::<4>::new();
        let mut buf = [7_u8; 8];
        let mut version = 0;
        assert_eq!(ms.load(&mut buf, &mut version), Err(StorageError::NotFound));
        assert_eq!(buf, [7; 8]);
    }

    #[test]
    fn newest_save_wins() {
        let mut ms = MemoryStorage::<4>::new();
        let mut version = 0;
        for i in 0..10_u8 {
            ms.save(&[i; 8], &mut version).unwrap();
        }
        assert_eq!(version, 10);

        let mut buf = [0; 8];
        let mut loaded_version = 0;
        ms.load(&mut buf, &mut loaded_version).unwrap();
        assert_eq!(buf, [9; 8]);
        assert_eq!(loaded_version, 10);
    }

    #[test]
    fn version_advances_on_every_save() {
        let mut ms = MemoryStorage::<2>::new();
        let mut version = u16::MAX - 1;
        ms.save(&[1], &mut version).unwrap();
        assert_eq!(version, u16::MAX);
        ms.save(&[2], &mut version).unwrap();
        assert_eq!(version, 0);

        // the wrapped version is still the newest
        let mut buf = [0];
        ms.load(&mut buf, &mut version).unwrap();
        assert_eq!(buf, [2]);
    }

    #[test]
    fn size_mismatch_is_reported() {
        let mut ms = MemoryStorage::<1>::new();
        let mut version = 0;
        ms.save(&[1, 2, 3], &mut version).unwrap();
        let mut buf = [0; 4];
        assert_eq!(ms.load(&mut buf, &mut version), Err(StorageError::SizeMismatch));
    }

    #[test]
    fn oversized_images_do_not_fit() {
        let mut ms = MemoryStorage::<1>::new();
        let mut version = 0;
        assert_eq!(ms.save(&[0; SLOT_CAPACITY + 1], &mut version), Err(StorageError::Full));
        assert_eq!(ms.num_saves(), 0);
    }
}
