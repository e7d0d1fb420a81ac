use crate::{error::violation, Error, Location, Result};

/// Hands out the array Locations of Regions and takes them back once a Region is gone.
///
/// Freed Locations are reused in stack order: [`allocate`](SlotAllocator::allocate) returns
/// the most recently freed one. Every Location below [`capacity`](SlotAllocator::capacity) is
/// either allocated or in the free pool, never both.
///
/// ## Examples
/// ```
/// # use region_pathfinding::database::SlotAllocator;
/// let mut slots = SlotAllocator::new(3);
/// assert_eq!(slots.allocate(), Ok(0));
/// assert_eq!(slots.allocate(), Ok(1));
/// slots.free(0).unwrap();
/// assert_eq!(slots.allocate(), Ok(0));
/// assert_eq!(slots.allocate(), Ok(2));
/// assert!(slots.allocate().is_err());
///
/// slots.grow(2);
/// assert_eq!(slots.allocate(), Ok(3));
/// assert_eq!(slots.live_count(), 4);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotAllocator {
    free: Vec<Location>,
    is_free: Vec<bool>,
    live: usize,
}

impl SlotAllocator {
    /// Creates an allocator with `capacity` free Locations
    pub fn new(capacity: usize) -> SlotAllocator {
        let mut slots = SlotAllocator::default();
        slots.grow(capacity);
        slots
    }

    /// Recreates an allocator from its capacity and its free pool in stack order (the last
    /// element is handed out first). Every other Location is allocated.
    pub fn from_free_pool(capacity: usize, free: Vec<Location>) -> Result<SlotAllocator> {
        let mut is_free = vec![false; capacity];
        for &loc in free.iter() {
            match is_free.get_mut(loc) {
                None => {
                    return Err(violation!(
                        "free location {} is beyond the capacity {}",
                        loc,
                        capacity
                    ))
                }
                Some(true) => return Err(violation!("location {} is freed twice", loc)),
                Some(flag) => *flag = true,
            }
        }
        Ok(SlotAllocator {
            live: capacity - free.len(),
            free,
            is_free,
        })
    }

    /// The total number of Locations, allocated or not
    pub fn capacity(&self) -> usize {
        self.is_free.len()
    }

    /// The number of allocated Locations
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// The free pool, in stack order
    pub fn free_locations(&self) -> &[Location] {
        &self.free
    }

    /// `true` if `loc` is currently handed out
    pub fn is_allocated(&self, loc: Location) -> bool {
        matches!(self.is_free.get(loc), Some(false))
    }

    /// Takes the most recently freed Location out of the pool.
    ///
    /// Fails with [`Error::AllocatorExhausted`] if the pool is empty. Call
    /// [`grow`](SlotAllocator::grow) in that case.
    pub fn allocate(&mut self) -> Result<Location> {
        let loc = self.free.pop().ok_or(Error::AllocatorExhausted)?;
        self.is_free[loc] = false;
        self.live += 1;
        Ok(loc)
    }

    /// Returns a Location to the pool.
    pub fn free(&mut self, loc: Location) -> Result<()> {
        match self.is_free.get_mut(loc) {
            Some(flag @ false) => {
                *flag = true;
                self.free.push(loc);
                self.live -= 1;
                Ok(())
            }
            Some(true) => Err(violation!("location {} is freed twice", loc)),
            None => Err(violation!("location {} was never allocated", loc)),
        }
    }

    /// Adds `additional` new Locations to the pool. The lowest of them is handed out first.
    pub fn grow(&mut self, additional: usize) -> std::ops::Range<Location> {
        let start = self.capacity();
        let end = start + additional;
        self.is_free.resize(end, true);
        self.free.extend((start..end).rev());
        start..end
    }
}
