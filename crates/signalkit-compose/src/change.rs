#![forbid(unsafe_code)]

//! Positional change vectors emitted by [`merge`](crate::merge).

use std::ops::Index;

/// One slot per merged source; exactly one slot is populated per emission.
///
/// ```
/// use signalkit_compose::ChangeVector;
///
/// let changes = ChangeVector::single(3, 1, "July");
/// assert_eq!(changes.len(), 3);
/// assert_eq!(changes[0], None);
/// assert_eq!(changes.changed(), Some((1, &"July")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeVector<T> {
    slots: Vec<Option<T>>,
}

impl<T> ChangeVector<T> {
    /// A vector of `width` absent slots with `value` at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= width`.
    #[must_use]
    pub fn single(width: usize, index: usize, value: T) -> Self {
        assert!(index < width, "slot {index} out of range for width {width}");
        let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(width).collect();
        slots[index] = Some(value);
        Self { slots }
    }

    /// Number of slots (the number of merged sources).
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Value in slot `index`, if that source is the one that emitted.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// The populated slot and its value.
    #[must_use]
    pub fn changed(&self) -> Option<(usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .find_map(|(index, slot)| slot.as_ref().map(|value| (index, value)))
    }

    /// Consume the vector, keeping only the populated value.
    #[must_use]
    pub fn into_changed(self) -> Option<T> {
        self.slots.into_iter().flatten().next()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Option<T>> {
        self.slots.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Option<T>] {
        &self.slots
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Option<T>> {
        self.slots
    }
}

impl<T> Index<usize> for ChangeVector<T> {
    type Output = Option<T>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.slots[index]
    }
}

impl<'a, T> IntoIterator for &'a ChangeVector<T> {
    type Item = &'a Option<T>;
    type IntoIter = std::slice::Iter<'a, Option<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

impl<T> From<ChangeVector<T>> for Vec<Option<T>> {
    fn from(changes: ChangeVector<T>) -> Self {
        changes.slots
    }
}
