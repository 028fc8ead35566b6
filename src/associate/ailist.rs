//! Augmented interval list over half-open `i64` intervals.
//!
//! From <https://academic.oup.com/bioinformatics/article/35/23/4907/5509521>.
//!
//! Intervals are sorted by start and split into components. An interval that
//! contains the ends of most of its following neighbours is moved into a later
//! component, so within each component a running maximum of the ends lets a
//! query stop walking left as soon as nothing further back can reach it.
//! A query costs one binary search per component plus the number of hits.

use std::mem::swap;

/// Neighbours an interval must cover before it is moved to the next component.
const MIN_COVERAGE: usize = 10;

/// A half-open interval `[start, end)` carrying a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval<T> {
    pub start: i64,
    pub end: i64,
    pub val: T,
}

#[derive(Debug, Clone)]
pub struct AIList<T> {
    starts: Vec<i64>,
    ends: Vec<i64>,
    max_ends: Vec<i64>,
    /// Offset of each component in the flat vectors.
    header_list: Vec<usize>,
    values: Vec<T>,
}

/// Scratch space for one decomposition round.
#[derive(Debug)]
struct Decomposed<T> {
    starts: Vec<i64>,
    ends: Vec<i64>,
    max_ends: Vec<i64>,
    values: Vec<T>,
    /// Intervals left for the next component.
    l2: Vec<Interval<T>>,
}

impl<T> Decomposed<T> {
    fn with_capacity(cap: usize) -> Self {
        Decomposed {
            starts: Vec::with_capacity(cap),
            ends: Vec::with_capacity(cap),
            max_ends: Vec::with_capacity(cap),
            values: Vec::with_capacity(cap),
            l2: Vec::with_capacity(cap),
        }
    }

    fn clear(&mut self) {
        self.starts.clear();
        self.ends.clear();
        self.max_ends.clear();
        self.values.clear();
        self.l2.clear();
    }
}

impl<T: Copy> AIList<T> {
    pub fn build(mut intervals: Vec<Interval<T>>) -> Self {
        // Stable, so equal starts keep the caller's order
        intervals.sort_by_key(|iv| iv.start);

        let n = intervals.len();
        let mut starts = Vec::with_capacity(n);
        let mut ends = Vec::with_capacity(n);
        let mut max_ends = Vec::with_capacity(n);
        let mut values = Vec::with_capacity(n);
        let mut scratch = Decomposed::with_capacity(n);
        let mut header_list = vec![0];

        loop {
            Self::decompose(&intervals, &mut scratch);

            starts.append(&mut scratch.starts);
            ends.append(&mut scratch.ends);
            max_ends.append(&mut scratch.max_ends);
            values.append(&mut scratch.values);
            swap(&mut intervals, &mut scratch.l2);

            if intervals.is_empty() {
                break;
            }
            header_list.push(starts.len());
        }

        AIList {
            starts,
            ends,
            max_ends,
            header_list,
            values,
        }
    }

    fn decompose(intervals: &[Interval<T>], scratch: &mut Decomposed<T>) {
        scratch.clear();

        for (index, interval) in intervals.iter().enumerate() {
            let covered = intervals
                .iter()
                .skip(index + 1)
                .take(MIN_COVERAGE * 2 - 1)
                .filter(|next| interval.end > next.end)
                .count();

            if covered >= MIN_COVERAGE {
                scratch.l2.push(*interval);
            } else {
                scratch.starts.push(interval.start);
                scratch.ends.push(interval.end);
                scratch.values.push(interval.val);
            }
        }

        let mut max = i64::MIN;
        for &end in &scratch.ends {
            max = max.max(end);
            scratch.max_ends.push(max);
        }
    }

    /// Values of all intervals overlapping `[start, end)`, in no particular order.
    pub fn find(&self, start: i64, end: i64) -> Vec<T> {
        let mut found = Vec::new();
        self.visit(start, end, |val| found.push(val));
        found
    }

    /// Call `hit` for every overlapping interval; returns how many entries
    /// were examined.
    pub(crate) fn visit<F: FnMut(T)>(&self, start: i64, end: i64, mut hit: F) -> usize {
        let mut examined = 0;

        for (component, &lo) in self.header_list.iter().enumerate() {
            let hi = self
                .header_list
                .get(component + 1)
                .copied()
                .unwrap_or(self.starts.len());

            let mut i = self.starts[lo..hi].partition_point(|&s| s < end);
            while i > 0 {
                i -= 1;
                examined += 1;
                let k = lo + i;
                if self.ends[k] > start {
                    hit(self.values[k]);
                } else if self.max_ends[k] <= start {
                    break;
                }
            }
        }

        examined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: i64, end: i64, val: usize) -> Interval<usize> {
        Interval { start, end, val }
    }

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort_unstable();
        v
    }

    #[test]
    fn test_find_half_open() {
        let list = AIList::build(vec![iv(1000, 2000, 0), iv(1500, 2500, 1), iv(5000, 6000, 2)]);
        assert_eq!(sorted(list.find(1800, 2200)), vec![0, 1]);
        assert_eq!(sorted(list.find(2000, 2001)), vec![1]);
        assert!(list.find(2500, 5000).is_empty());
        assert_eq!(list.find(5999, 7000), vec![2]);
    }

    #[test]
    fn test_empty_list() {
        let list: AIList<usize> = AIList::build(Vec::new());
        assert!(list.starts.is_empty());
        assert!(list.find(0, 100).is_empty());
    }

    #[test]
    fn test_long_interval_moves_to_second_component() {
        let mut intervals = vec![iv(0, 1_000_000, 99)];
        for i in 0..30 {
            intervals.push(iv(100 + i * 100, 150 + i * 100, i as usize));
        }
        let list = AIList::build(intervals);

        assert_eq!(list.starts.len(), 31);
        assert_eq!(list.header_list, vec![0, 30]);
        assert_eq!(sorted(list.find(500_000, 500_001)), vec![99]);
        assert_eq!(sorted(list.find(110, 120)), vec![0, 99]);
    }

    #[test]
    fn test_walk_stops_at_first_unreachable_entry() {
        let intervals: Vec<_> = (0..10_000).map(|i| iv(i * 100, i * 100 + 100, i as usize)).collect();
        let list = AIList::build(intervals);

        let mut hits = Vec::new();
        let examined = list.visit(500_050, 500_051, |v| hits.push(v));
        assert_eq!(hits, vec![5000]);
        assert_eq!(examined, 2);
    }
}
