//! Fixed-capacity rolling window of readings

use std::collections::VecDeque;

/// Keeps the most recent `capacity` values, oldest first.
#[derive(Debug, Clone)]
pub struct RollingBuffer<T> {
    values: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> RollingBuffer<T> {
    /// A full window where every slot holds `fill`
    pub fn filled(capacity: usize, fill: T) -> Self {
        let mut values = VecDeque::with_capacity(capacity + 1);
        values.extend(std::iter::repeat(fill).take(capacity));
        Self { values, capacity }
    }
}

impl<T> RollingBuffer<T> {
    /// Append at the tail, evicting from the head once over capacity.
    /// Returns the evicted value.
    pub fn push(&mut self, value: T) -> Option<T> {
        self.values.push_back(value);
        if self.values.len() > self.capacity {
            self.values.pop_front()
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent value
    #[cfg(test)]
    pub fn latest(&self) -> Option<&T> {
        self.values.back()
    }

    /// Oldest to newest
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }
}

impl<T: Copy + Into<f64>> RollingBuffer<T> {
    /// Chart points: (slot index, value)
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v.into()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_full_of_zeros() {
        let buffer = RollingBuffer::filled(100, 0u32);
        assert_eq!(buffer.len(), 100);
        assert!(buffer.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut buffer = RollingBuffer::filled(3, 0u32);
        assert_eq!(buffer.push(1), Some(0));
        assert_eq!(buffer.push(2), Some(0));
        assert_eq!(buffer.push(3), Some(0));
        assert_eq!(buffer.push(4), Some(1));
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(buffer.latest(), Some(&4));
    }

    #[test]
    fn test_reading_lands_at_tail() {
        let mut buffer = RollingBuffer::filled(100, 0u32);
        buffer.push(512);
        assert_eq!(buffer.latest(), Some(&512));
        assert_eq!(buffer.len(), 100);

        let points = buffer.points();
        assert_eq!(points.last(), Some(&(99.0, 512.0)));
    }

    proptest! {
        #[test]
        fn prop_keeps_last_capacity_values(values in proptest::collection::vec(any::<u32>(), 100..400)) {
            let mut buffer = RollingBuffer::filled(100, 0u32);
            for &v in &values {
                buffer.push(v);
                prop_assert!(buffer.len() <= buffer.capacity());
            }
            let kept: Vec<u32> = buffer.iter().copied().collect();
            prop_assert_eq!(&kept[..], &values[values.len() - 100..]);
        }
    }
}
