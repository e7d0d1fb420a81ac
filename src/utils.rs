#[allow(clippy::wrong_self_convention)]
pub trait IterExt<T>: Iterator<Item = T> {
    fn to_vec(self) -> Vec<T>;
    /// collects into a sorted Vec without duplicates
    fn to_sorted_set(self) -> Vec<T>
    where
        T: Ord;
}
impl<T, I: Iterator<Item = T>> IterExt<T> for I {
    #[allow(clippy::wrong_self_convention)]
    fn to_vec(self) -> Vec<T> {
        self.collect()
    }
    fn to_sorted_set(self) -> Vec<T>
    where
        T: Ord,
    {
        let mut ret: Vec<T> = self.collect();
        ret.sort_unstable();
        ret.dedup();
        ret
    }
}

/// inserts `value` into the sorted `set`. Returns `false` if it was already present.
pub fn sorted_insert<T: Ord>(set: &mut Vec<T>, value: T) -> bool {
    match set.binary_search(&value) {
        Ok(_) => false,
        Err(index) => {
            set.insert(index, value);
            true
        }
    }
}

/// removes `value` from the sorted `set`. Returns `false` if it was not present.
pub fn sorted_remove<T: Ord>(set: &mut Vec<T>, value: &T) -> bool {
    match set.binary_search(value) {
        Ok(index) => {
            set.remove(index);
            true
        }
        Err(_) => false,
    }
}
